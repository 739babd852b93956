//! Confidentiality levels for series and messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered confidentiality level, least to most visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Raw,
    Private,
    Protected,
    Public,
}

impl AccessLevel {
    /// Level used wherever an item carries no visibility at all.
    pub const DEFAULT: AccessLevel = AccessLevel::Private;

    pub const ALL: [AccessLevel; 4] = [
        AccessLevel::Raw,
        AccessLevel::Private,
        AccessLevel::Protected,
        AccessLevel::Public,
    ];

    /// True iff `self` sits strictly below `cutoff`.
    pub fn is_less_visible_than(self, cutoff: AccessLevel) -> bool {
        self < cutoff
    }

    /// Comparison over optional levels.
    ///
    /// An absent level is less visible than any cutoff, but an absent cutoff
    /// asks for everything and never reports "less visible".
    pub fn is_level_less_visible_than_cutoff(
        to_test: Option<AccessLevel>,
        cutoff: Option<AccessLevel>,
    ) -> bool {
        match (to_test, cutoff) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(level), Some(cutoff)) => level.is_less_visible_than(cutoff),
        }
    }

    /// Absent visibility counts as [`AccessLevel::DEFAULT`].
    pub fn effective(level: Option<AccessLevel>) -> AccessLevel {
        level.unwrap_or(Self::DEFAULT)
    }

    /// Short lowercase name, used in paths and config.
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Raw => "raw",
            AccessLevel::Private => "private",
            AccessLevel::Protected => "protected",
            AccessLevel::Public => "public",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccessLevel::Raw => "Private (Raw)",
            AccessLevel::Private => "Private",
            AccessLevel::Protected => "Protected",
            AccessLevel::Public => "Public",
        };
        f.write_str(label)
    }
}

/// Parses the spreadsheet spelling, case-insensitively.
impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(AccessLevel::Public),
            "protected" => Ok(AccessLevel::Protected),
            "private" => Ok(AccessLevel::Private),
            "private (raw)" | "raw" => Ok(AccessLevel::Raw),
            _ => Err(format!("unknown visibility '{}'", s)),
        }
    }
}
