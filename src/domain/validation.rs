//! Per-entity validation results.
//!
//! Errors drop the entity, warnings keep it. Either way the problems are
//! logged once per entity under a single header line.

use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub text: String,
}

/// Problems found while validating one message or series.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    kind: &'static str,
    subject: String,
    issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new(kind: &'static str, subject: Option<&str>) -> Self {
        Self {
            kind,
            subject: subject.unwrap_or("<untitled>").to_string(),
            issues: Vec::new(),
        }
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Error,
            text: text.into(),
        });
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            text: text.into(),
        });
    }

    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(|i| i.text.as_str())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .map(|i| i.text.as_str())
    }

    /// Emit the header and one line per problem. Silent when clean.
    pub fn log(&self) {
        if self.is_clean() {
            return;
        }
        warn!("{} '{}' has the following problems:", self.kind, self.subject);
        for issue in &self.issues {
            warn!("    * {}", issue.text);
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return Ok(());
        }
        writeln!(f, "{} '{}' has the following problems:", self.kind, self.subject)?;
        for issue in &self.issues {
            writeln!(f, "    * {}", issue.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_printed_once() {
        let mut report = ValidationReport::new("Message", Some("Easter"));
        report.error("has no date");
        report.warning("has an unknown type 'Skit'");

        let text = report.to_string();
        assert_eq!(text.matches("has the following problems").count(), 1);
        assert!(text.contains("    * has no date\n"));
        assert!(!report.is_valid());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_warnings_only_is_valid() {
        let mut report = ValidationReport::new("Series", None);
        report.warning("has no message count");
        assert!(report.is_valid());
        assert!(report.to_string().starts_with("Series '<untitled>'"));
    }

    #[test]
    fn test_clean_report_renders_nothing() {
        let report = ValidationReport::new("Series", Some("Acts"));
        assert!(report.is_clean());
        assert_eq!(report.to_string(), "");
    }
}
