//! A named grouping of messages, read from the series table.

use crate::domain::access_level::AccessLevel;
use crate::domain::filters::FilterChain;
use crate::domain::message::{canonical_speakers, compare_dates, Message};
use crate::domain::resource::{parse_link, parse_resource_list, Resource, SeriesRef};
use crate::domain::row::Row;
use crate::domain::validation::ValidationReport;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use url::Url;

/// Columns the series table must carry.
pub const SERIES_COLUMNS: &[&str] = &[
    "name",
    "datestarted",
    "dateended",
    "messages",
    "speaker",
    "description",
    "booklets",
    "resources",
    "visibility",
    "coverart",
    "coverimage",
    "webid",
];

/// A series of messages. `messages` is filled once by
/// [`Series::discover_messages`], in track order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Series {
    pub id: Option<String>,
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Explicit count from the sheet. Overrides the discovered count.
    #[serde(skip)]
    pub explicit_message_count: Option<i64>,
    pub speakers: Vec<String>,
    pub description: Option<String>,
    pub visibility: Option<AccessLevel>,
    pub cover_art_link: Option<Url>,
    pub cover_image_link: Option<Url>,
    pub booklets: Vec<Resource>,
    pub resources: Vec<Resource>,
    pub messages: Vec<Arc<Message>>,
    #[serde(skip)]
    pub parse_errors: Vec<String>,
}

impl Series {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn from_row(row: &Row) -> Self {
        let mut series = Series {
            id: row.string("webid"),
            title: row.string("name"),
            speakers: row.list("speaker"),
            description: row.string("description"),
            ..Default::default()
        };

        match row.date("datestarted") {
            Ok(date) => series.start_date = date,
            Err(e) => series.parse_errors.push(e),
        }
        match row.date("dateended") {
            Ok(date) => series.end_date = date,
            Err(e) => series.parse_errors.push(e),
        }
        match row.long("messages") {
            Ok(count) => series.explicit_message_count = count,
            Err(e) => series.parse_errors.push(e),
        }

        if let Some(value) = row.value("visibility") {
            match value.parse::<AccessLevel>() {
                Ok(level) => series.visibility = Some(level),
                Err(e) => series.parse_errors.push(e),
            }
        }

        match parse_link(row.value("coverart"), "cover art") {
            Ok(link) => series.cover_art_link = link,
            Err(e) => series.parse_errors.push(e),
        }
        match parse_link(row.value("coverimage"), "cover image") {
            Ok(link) => series.cover_image_link = link,
            Err(e) => series.parse_errors.push(e),
        }

        let source = series.source_ref();
        let (booklets, error) = parse_resource_list(row.value("booklets"));
        series.booklets = booklets
            .into_iter()
            .map(|b| b.with_series(source.clone()))
            .collect();
        series.parse_errors.extend(error);

        let (resources, error) = parse_resource_list(row.value("resources"));
        series.resources = resources
            .into_iter()
            .map(|r| r.with_series(source.clone()))
            .collect();
        series.parse_errors.extend(error);

        series
    }

    pub fn source_ref(&self) -> SeriesRef {
        SeriesRef {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }

    pub fn effective_visibility(&self) -> AccessLevel {
        AccessLevel::effective(self.visibility)
    }

    /// Explicit count if the sheet gave one, else the discovered members.
    pub fn message_count(&self) -> i64 {
        self.explicit_message_count
            .unwrap_or(self.messages.len() as i64)
    }

    /// A pseudo-series that only exists to publish a document.
    pub fn is_booklet(&self) -> bool {
        self.start_date.is_none() && self.message_count() == 0 && !self.booklets.is_empty()
    }

    pub fn add_message(&mut self, message: Arc<Message>) {
        self.messages.push(message);
    }

    /// Collect every message with a track under this series' title, sorted by
    /// track number. Returns the member count.
    pub fn discover_messages(&mut self, all: &[Arc<Message>]) -> usize {
        let Some(title) = self.title.clone() else {
            self.messages.clear();
            return 0;
        };

        let mut members: Vec<(u32, Arc<Message>)> = all
            .iter()
            .filter_map(|m| m.track_number(&title).map(|track| (track, Arc::clone(m))))
            .collect();
        members.sort_by_key(|(track, _)| *track);

        self.messages = members.into_iter().map(|(_, m)| m).collect();
        self.messages.len()
    }

    /// Validate against the identifiers seen so far in this load. A valid
    /// series' identifier is added to `seen_ids`.
    pub fn validate(&self, seen_ids: &mut HashSet<String>) -> ValidationReport {
        let mut report = ValidationReport::new("Series", self.title.as_deref());
        let booklet = self.is_booklet();

        match &self.id {
            None => report.error("has no identifier"),
            Some(id) if seen_ids.contains(id) => {
                report.error(format!("has a duplicate identifier '{}'", id))
            }
            Some(_) => {}
        }

        if self.title.is_none() {
            report.error("has no title");
        }

        if !booklet {
            if self.start_date.is_none() {
                report.error("has no start date");
            }

            let found = self.messages.len() as i64;
            match self.explicit_message_count {
                None => report.warning("has no message count, will be handled on a best effort basis"),
                Some(count) if count < 1 => report.error("has 0 messages"),
                Some(count) if count != found => report.warning(format!(
                    "has a message count of {}, but {} messages were found",
                    count, found
                )),
                Some(_) => {}
            }

            let hidden = self
                .messages
                .iter()
                .filter(|m| AccessLevel::is_level_less_visible_than_cutoff(m.visibility, self.visibility))
                .count();
            if hidden > 0 {
                report.warning(format!(
                    "has visibility of {}, but {} of {} messages are less visible and may not be displayed",
                    self.effective_visibility(),
                    hidden,
                    self.messages.len()
                ));
            }
        }

        for booklet in &self.booklets {
            if !booklet.is_document() {
                report.warning(format!("has a booklet '{}' that is not a document", booklet.name));
            }
        }

        for error in &self.parse_errors {
            report.error(error.clone());
        }

        if report.is_valid() {
            if let Some(id) = &self.id {
                seen_ids.insert(id.clone());
            }
        }
        report
    }

    pub fn normalize(&mut self) {
        canonical_speakers(&mut self.speakers);
    }

    /// Member messages that qualify as members of this series under `chain`.
    pub fn visible_messages(&self, chain: &FilterChain) -> Vec<Arc<Message>> {
        self.messages
            .iter()
            .filter(|m| chain.includes_member(self, m))
            .cloned()
            .collect()
    }

    fn natural_key(&self) -> (Option<&str>, Option<&str>, Option<NaiveDate>, Option<NaiveDate>) {
        (
            self.id.as_deref(),
            self.title.as_deref(),
            self.start_date,
            self.end_date,
        )
    }

    /// Oldest first, undated last.
    pub fn by_date(a: &Series, b: &Series) -> Ordering {
        compare_dates(a.start_date, b.start_date, false)
    }

    /// Newest first, undated last.
    pub fn by_date_descending(a: &Series, b: &Series) -> Ordering {
        compare_dates(a.start_date, b.start_date, true)
    }
}

/// Series compare by natural key (id, title, dates), not by members.
impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        self.natural_key() == other.natural_key()
    }
}

impl Eq for Series {}

impl Hash for Series {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.natural_key().hash(state);
    }
}

/// Drop later series equal to an earlier one. Order is kept.
pub fn without_duplicates(list: Vec<Arc<Series>>) -> Vec<Arc<Series>> {
    let mut seen: HashSet<Arc<Series>> = HashSet::with_capacity(list.len());
    list.into_iter()
        .filter(|s| seen.insert(Arc::clone(s)))
        .collect()
}

/// Sort in place, oldest first or newest first. Undated series go last.
pub fn sort_series_by_date(list: &mut [Arc<Series>], newest_first: bool) {
    if newest_first {
        list.sort_by(|a, b| Series::by_date_descending(a, b));
    } else {
        list.sort_by(|a, b| Series::by_date(a, b));
    }
}
