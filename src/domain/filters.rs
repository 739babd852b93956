//! Inclusion predicates over series and messages, and the chain that
//! combines them.
//!
//! A [`FilterChain`] is an immutable value built for one output view and
//! passed to every catalog query that needs it. An item is included only if
//! every filter in the chain includes it.

use crate::domain::access_level::AccessLevel;
use crate::domain::message::Message;
use crate::domain::series::Series;
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::BTreeSet;

/// Include and exclude lists for a free-text tag (type, ministry).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn without<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Listed in the include set, or missing from a non-empty exclude set.
    /// An untagged item never matches.
    pub fn matches(&self, tag: Option<&str>) -> bool {
        let Some(tag) = tag else {
            return false;
        };
        if !self.include.is_empty() && self.include.contains(tag) {
            return true;
        }
        !self.exclude.is_empty() && !self.exclude.contains(tag)
    }
}

/// How a year filter relates a series' date span to the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearMode {
    StartedWithin,
    EntirelyWithin,
    IntersectingWith,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogFilter {
    /// Effective visibility must equal the level exactly.
    Visibility(AccessLevel),
    Type(TagSet),
    Ministry(TagSet),
    /// Dates on or after the cutoff.
    Recent { cutoff: NaiveDate },
    Year { year: i32, mode: YearMode },
    /// `true` keeps only booklet-only series, `false` drops them.
    Booklet(bool),
}

impl CatalogFilter {
    pub fn visibility(level: AccessLevel) -> Self {
        Self::Visibility(level)
    }

    pub fn types(tags: TagSet) -> Self {
        Self::Type(tags)
    }

    pub fn ministries(tags: TagSet) -> Self {
        Self::Ministry(tags)
    }

    /// Recent relative to `today`: the cutoff is `days` before it.
    pub fn recent_from(days: i64, today: NaiveDate) -> Self {
        Self::Recent {
            cutoff: today - Duration::days(days),
        }
    }

    /// Recent relative to the local calendar date.
    pub fn recent(days: i64) -> Self {
        Self::recent_from(days, Local::now().date_naive())
    }

    pub fn year(year: i32, mode: YearMode) -> Self {
        Self::Year { year, mode }
    }

    pub fn booklets(want: bool) -> Self {
        Self::Booklet(want)
    }

    pub fn includes_series(&self, series: &Series) -> bool {
        match self {
            Self::Visibility(level) => series.effective_visibility() == *level,
            Self::Type(tags) => series
                .messages
                .iter()
                .any(|m| tags.matches(m.kind.as_deref())),
            Self::Ministry(tags) => series
                .messages
                .iter()
                .any(|m| tags.matches(m.ministry.as_deref())),
            Self::Recent { cutoff } => series.end_date.is_none_or(|end| end >= *cutoff),
            Self::Year { year, mode } => series_in_year(series, *year, *mode),
            Self::Booklet(want) => series.is_booklet() == *want,
        }
    }

    pub fn includes_message(&self, message: &Message) -> bool {
        match self {
            Self::Visibility(level) => message.effective_visibility() == *level,
            Self::Type(tags) => tags.matches(message.kind.as_deref()),
            Self::Ministry(tags) => tags.matches(message.ministry.as_deref()),
            Self::Recent { cutoff } => message.date.is_some_and(|d| d >= *cutoff),
            Self::Year { year, .. } => in_year(message.date, *year),
            Self::Booklet(_) => true,
        }
    }

    /// Whether `message` qualifies as a member of `series`.
    pub fn includes_member(&self, series: &Series, message: &Message) -> bool {
        match self {
            Self::Visibility(_) => {
                self.includes_series(series)
                    && !message
                        .effective_visibility()
                        .is_less_visible_than(series.effective_visibility())
            }
            Self::Type(_) | Self::Ministry(_) => self.includes_message(message),
            Self::Recent { .. } | Self::Year { .. } | Self::Booklet(_) => {
                self.includes_series(series)
            }
        }
    }
}

fn in_year(date: Option<NaiveDate>, year: i32) -> bool {
    date.is_some_and(|d| d.year() == year)
}

fn series_in_year(series: &Series, year: i32, mode: YearMode) -> bool {
    match mode {
        YearMode::StartedWithin => in_year(series.start_date, year),
        YearMode::EntirelyWithin => {
            in_year(series.start_date, year)
                && series.end_date.is_none_or(|end| end.year() == year)
        }
        YearMode::IntersectingWith => {
            in_year(series.start_date, year)
                || in_year(series.end_date, year)
                || series.messages.iter().any(|m| in_year(m.date, year))
        }
    }
}

/// Ordered, immutable set of filters. Empty includes everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChain {
    filters: Vec<CatalogFilter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: CatalogFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(&self) -> &[CatalogFilter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Target of the visibility filter, or the most restrictive default
    /// when none is configured.
    pub fn visibility(&self) -> AccessLevel {
        self.filters
            .iter()
            .find_map(|f| match f {
                CatalogFilter::Visibility(level) => Some(*level),
                _ => None,
            })
            .unwrap_or(AccessLevel::DEFAULT)
    }

    pub fn includes_series(&self, series: &Series) -> bool {
        self.filters.iter().all(|f| f.includes_series(series))
    }

    pub fn includes_message(&self, message: &Message) -> bool {
        self.filters.iter().all(|f| f.includes_message(message))
    }

    pub fn includes_member(&self, series: &Series, message: &Message) -> bool {
        self.filters.iter().all(|f| f.includes_member(series, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn typed(kind: &str) -> Arc<Message> {
        let mut msg = Message::new(kind, Some(date(2015, 1, 1)));
        msg.kind = Some(kind.to_string());
        msg.ministry = Some("WOL".to_string());
        Arc::new(msg)
    }

    fn with_visibility(level: Option<AccessLevel>) -> Series {
        let mut series = Series::new("S", "Series");
        series.visibility = level;
        series
    }

    #[test]
    fn test_visibility_is_exact() {
        let public = CatalogFilter::visibility(AccessLevel::Public);
        assert!(public.includes_series(&with_visibility(Some(AccessLevel::Public))));
        assert!(!public.includes_series(&with_visibility(Some(AccessLevel::Protected))));

        let private = CatalogFilter::visibility(AccessLevel::Private);
        assert!(private.includes_series(&with_visibility(None)));
    }

    #[test]
    fn test_visibility_member_may_be_more_visible() {
        let filter = CatalogFilter::visibility(AccessLevel::Protected);
        let series = with_visibility(Some(AccessLevel::Protected));

        let mut msg = Message::new("m", Some(date(2015, 1, 1)));
        msg.visibility = Some(AccessLevel::Public);
        assert!(filter.includes_member(&series, &msg));

        msg.visibility = Some(AccessLevel::Private);
        assert!(!filter.includes_member(&series, &msg));

        let public_series = with_visibility(Some(AccessLevel::Public));
        msg.visibility = Some(AccessLevel::Public);
        assert!(!filter.includes_member(&public_series, &msg));
    }

    #[test]
    fn test_type_filter_is_existential() {
        let filter = CatalogFilter::types(TagSet::new().with(["Message"]));

        let mut mixed = Series::new("S", "Mixed");
        mixed.messages = vec![typed("Message"), typed("Song")];
        assert!(filter.includes_series(&mixed));

        let mut songs = Series::new("S2", "Songs");
        songs.messages = vec![typed("Song")];
        assert!(!filter.includes_series(&songs));

        assert!(!filter.includes_message(&Message::new("untyped", None)));
    }

    #[test]
    fn test_type_filter_exclusion() {
        let filter = CatalogFilter::types(TagSet::new().without(["Song"]));
        assert!(filter.includes_message(&typed("Message")));
        assert!(!filter.includes_message(&typed("Song")));
        assert!(!CatalogFilter::types(TagSet::new()).includes_message(&typed("Message")));
    }

    #[test]
    fn test_ministry_filter() {
        let filter = CatalogFilter::ministries(TagSet::new().with(["WOL"]));
        assert!(filter.includes_message(&typed("Message")));
        let mut other = Message::new("m", None);
        other.ministry = Some("CAMP".into());
        assert!(!filter.includes_message(&other));
        assert!(!filter.includes_series(&Series::new("S", "Empty")));
    }

    #[test]
    fn test_recent_boundary_is_inclusive() {
        let today = date(2015, 6, 30);
        let filter = CatalogFilter::recent_from(60, today);

        let mut series = Series::new("S", "Series");
        series.end_date = Some(today - Duration::days(60));
        assert!(filter.includes_series(&series));
        series.end_date = Some(today - Duration::days(61));
        assert!(!filter.includes_series(&series));
        series.end_date = None;
        assert!(filter.includes_series(&series));

        assert!(!filter.includes_message(&Message::new("undated", None)));
        assert!(filter.includes_message(&Message::new("today", Some(today))));
    }

    #[test]
    fn test_year_modes() {
        let mut series = Series::new("S", "Series");
        series.start_date = Some(date(2014, 12, 7));
        series.end_date = Some(date(2015, 2, 1));

        assert!(CatalogFilter::year(2014, YearMode::StartedWithin).includes_series(&series));
        assert!(!CatalogFilter::year(2014, YearMode::EntirelyWithin).includes_series(&series));
        assert!(CatalogFilter::year(2015, YearMode::IntersectingWith).includes_series(&series));

        let mut long = Series::new("L", "Long");
        long.start_date = Some(date(2013, 1, 1));
        long.end_date = Some(date(2015, 1, 1));
        long.messages = vec![Arc::new(Message::new("mid", Some(date(2014, 6, 1))))];
        assert!(CatalogFilter::year(2014, YearMode::IntersectingWith).includes_series(&long));
        assert!(!CatalogFilter::year(2012, YearMode::IntersectingWith).includes_series(&long));

        let mut open = Series::new("O", "Open");
        open.start_date = Some(date(2015, 3, 1));
        assert!(CatalogFilter::year(2015, YearMode::EntirelyWithin).includes_series(&open));
    }

    #[test]
    fn test_booklet_filter() {
        let mut booklet = Series::new("B", "Booklet");
        booklet
            .booklets
            .push(crate::domain::Resource::parse("http://example.com/b.pdf").unwrap());
        assert!(CatalogFilter::booklets(true).includes_series(&booklet));
        assert!(!CatalogFilter::booklets(false).includes_series(&booklet));
        assert!(CatalogFilter::booklets(true).includes_message(&Message::new("m", None)));
    }

    #[test]
    fn test_chain_requires_all() {
        let chain = FilterChain::new()
            .with(CatalogFilter::visibility(AccessLevel::Public))
            .with(CatalogFilter::types(TagSet::new().with(["Message"])));

        let mut msg = (*typed("Message")).clone();
        msg.visibility = Some(AccessLevel::Public);
        assert!(chain.includes_message(&msg));
        msg.kind = Some("Song".into());
        assert!(!chain.includes_message(&msg));

        assert!(FilterChain::new().includes_message(&Message::default()));
        assert_eq!(chain.visibility(), AccessLevel::Public);
        assert_eq!(FilterChain::new().visibility(), AccessLevel::Private);
    }
}
