//! One recorded talk from the messages table.

use crate::domain::access_level::AccessLevel;
use crate::domain::resource::{parse_link, parse_resource_list, MessageRef, Resource};
use crate::domain::row::Row;
use crate::domain::validation::ValidationReport;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use url::Url;

/// Columns the messages table must carry.
pub const MESSAGE_COLUMNS: &[&str] = &[
    "date",
    "name",
    "speaker",
    "audiolink",
    "videolink",
    "ministry",
    "type",
    "visibility",
    "seriesname",
    "track",
    "description",
    "resources",
];

/// Recognized values of the free-text type column. Others only warn.
pub const MESSAGE_TYPES: &[&str] = &[
    "Ask Pastor",
    "C.O.R.E.",
    "Message",
    "Prayer",
    "Q&A",
    "Song",
    "Special Event",
    "Testimony",
    "Training",
    "Word",
];

/// Series names that mark a message as deliberately not part of a series.
pub const STAND_ALONE_SERIES_NAMES: &[&str] = &["sam", "stand alone", "stand alone message"];

/// Speaker spellings rewritten by `normalize`.
const SPEAKER_TITLES: &[(&str, &str)] = &[("Vern Peltz", "Pastor Vern Peltz")];

pub(crate) fn canonical_speakers(speakers: &mut [String]) {
    for speaker in speakers.iter_mut() {
        if let Some((_, titled)) = SPEAKER_TITLES.iter().find(|(raw, _)| raw == speaker) {
            *speaker = titled.to_string();
        }
    }
}

pub(crate) fn is_stand_alone_name(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    STAND_ALONE_SERIES_NAMES.contains(&name.as_str())
}

/// A recorded talk. `series` and `track_numbers` pair up by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub ministry: Option<String>,
    pub visibility: Option<AccessLevel>,
    pub speakers: Vec<String>,
    pub audio_link: Option<Url>,
    pub video_link: Option<Url>,
    pub series: Vec<String>,
    pub track_numbers: Vec<u32>,
    pub resources: Vec<Resource>,
    /// Cell-level problems found while reading the row.
    #[serde(skip)]
    pub parse_errors: Vec<String>,
}

impl Message {
    pub fn new(title: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self {
            title: Some(title.into()),
            date,
            ..Default::default()
        }
    }

    /// Build a message from one row. Never fails; problems land in
    /// `parse_errors` and surface through [`Message::validate`].
    pub fn from_row(row: &Row) -> Self {
        let mut msg = Message {
            title: row.string("name"),
            description: row.string("description"),
            kind: row.string("type"),
            ministry: row.string("ministry"),
            speakers: row.list("speaker"),
            ..Default::default()
        };
        msg.set_series(row.list("seriesname"));
        match row.date("date") {
            Ok(date) => msg.date = date,
            Err(e) => msg.parse_errors.push(e),
        }

        for track in row.list("track") {
            if track == "-" {
                continue;
            }
            match track.parse::<u32>() {
                Ok(n) => msg.track_numbers.push(n),
                Err(_) => msg
                    .parse_errors
                    .push(format!("unable to parse track number '{}'", track)),
            }
        }

        if let Some(value) = row.value("visibility") {
            match value.parse::<AccessLevel>() {
                Ok(level) => msg.visibility = Some(level),
                Err(e) => msg.parse_errors.push(e),
            }
        }

        match parse_link(row.value("audiolink"), "audio") {
            Ok(link) => msg.audio_link = link,
            Err(e) => msg.parse_errors.push(e),
        }
        match parse_link(row.value("videolink"), "video") {
            Ok(link) => msg.video_link = link,
            Err(e) => msg.parse_errors.push(e),
        }

        msg.set_resources(row.value("resources"));
        msg
    }

    /// Replace series names. Blanks and the `-` placeholder are dropped.
    pub fn set_series<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.series = names
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty() && s != "-")
            .collect();
    }

    /// Parse the resources cell and tag each link with this message.
    pub fn set_resources(&mut self, value: Option<&str>) {
        let (resources, error) = parse_resource_list(value);
        let source = self.source_ref();
        self.resources = resources
            .into_iter()
            .map(|r| r.with_message(source.clone()))
            .collect();
        if let Some(error) = error {
            self.parse_errors.push(error);
        }
    }

    pub fn source_ref(&self) -> MessageRef {
        MessageRef {
            title: self.title.clone(),
            date: self.date,
        }
    }

    pub fn effective_visibility(&self) -> AccessLevel {
        AccessLevel::effective(self.visibility)
    }

    /// Track number within the named series, matched case-insensitively.
    pub fn track_number(&self, series_name: &str) -> Option<u32> {
        self.series
            .iter()
            .zip(&self.track_numbers)
            .find(|(name, _)| name.eq_ignore_ascii_case(series_name))
            .map(|(_, track)| *track)
    }

    /// No real series membership: either none at all, or only stand-alone
    /// placeholder names.
    pub fn is_stand_alone(&self) -> bool {
        self.series.iter().all(|name| is_stand_alone_name(name))
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new("Message", self.title.as_deref());

        if self.title.is_none() {
            report.error("has no title");
        }
        if self.date.is_none() {
            report.error("has no date");
        }

        let series_count = self.series.len();
        let track_count = self.track_numbers.len();
        if series_count != track_count {
            report.error(format!(
                "is in {} series, but has track data for {} series",
                series_count, track_count
            ));
        }

        if let Some(kind) = &self.kind {
            if !MESSAGE_TYPES.contains(&kind.as_str()) {
                report.warning(format!("has an unknown type '{}'", kind));
            }
        }

        for error in &self.parse_errors {
            report.error(error.clone());
        }
        report
    }

    /// Canonicalize speaker names. Only run on messages that validated.
    pub fn normalize(&mut self) {
        canonical_speakers(&mut self.speakers);
    }

    /// Oldest first, undated last.
    pub fn by_date(a: &Message, b: &Message) -> Ordering {
        compare_dates(a.date, b.date, false)
    }

    /// Newest first, undated last.
    pub fn by_date_descending(a: &Message, b: &Message) -> Ordering {
        compare_dates(a.date, b.date, true)
    }
}

pub(crate) fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>, descending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_message() -> Message {
        let mut msg = Message::new("UNIT TEST", NaiveDate::from_ymd_opt(2015, 3, 1));
        msg.set_series(["ONE", "TWO"]);
        msg.track_numbers = vec![1, 2];
        msg.ministry = Some("WOL".into());
        msg.kind = Some("Message".into());
        msg.visibility = Some(AccessLevel::Private);
        msg
    }

    fn row() -> Row {
        Row::new()
            .with("date", "2015-03-01")
            .with("name", "Easter")
            .with("speaker", "Vern Peltz; Guest")
            .with("audiolink", "http://audio.com/link.mp3")
            .with("videolink", "n/a")
            .with("ministry", "WOL")
            .with("type", "Message")
            .with("visibility", "Public")
            .with("seriesname", "Resurrection")
            .with("track", "3")
            .with("resources", "Notes|http://example.com/notes.pdf")
    }

    #[test]
    fn test_valid_message_has_clean_report() {
        let report = valid_message().validate();
        assert!(report.is_valid());
        assert!(report.is_clean());
    }

    #[test]
    fn test_requires_title_and_date() {
        let mut msg = valid_message();
        msg.title = None;
        msg.date = None;
        let text = msg.validate().to_string();
        assert!(text.contains("has no title"));
        assert!(text.contains("has no date"));
    }

    #[test]
    fn test_track_count_must_match_series_count() {
        let mut msg = valid_message();
        msg.track_numbers = vec![1];
        let report = msg.validate();
        assert!(!report.is_valid());
        assert!(report.to_string().contains("2 series, but has track data for 1"));

        msg.set_series(Vec::<String>::new());
        assert!(msg.validate().to_string().contains("0 series, but has track data for 1"));
    }

    #[test]
    fn test_hyphen_series_validates_without_track() {
        let mut msg = valid_message();
        msg.set_series(["-"]);
        msg.track_numbers.clear();
        assert!(msg.series.is_empty());
        assert!(msg.validate().is_valid());
    }

    #[test]
    fn test_unknown_type_is_warning() {
        let mut msg = valid_message();
        msg.kind = Some("TESTING".into());
        let report = msg.validate();
        assert!(report.is_valid());
        assert!(report.to_string().contains("unknown type"));
    }

    #[test]
    fn test_from_row() {
        let msg = Message::from_row(&row());
        assert_eq!(msg.title.as_deref(), Some("Easter"));
        assert_eq!(msg.visibility, Some(AccessLevel::Public));
        assert_eq!(msg.track_number("resurrection"), Some(3));
        assert!(msg.video_link.is_none());
        assert_eq!(msg.resources.len(), 1);
        let source = msg.resources[0].source.message.as_ref().unwrap();
        assert_eq!(source.title.as_deref(), Some("Easter"));
        assert!(msg.validate().is_clean());
    }

    #[test]
    fn test_bad_cells_become_errors() {
        let row = row()
            .with("visibility", "VISIBLE")
            .with("audiolink", "NOT A URL")
            .with("track", "three")
            .with("date", "2015-02-30");
        let report = Message::from_row(&row).validate();
        assert!(!report.is_valid());
        let text = report.to_string();
        assert!(text.contains("unknown visibility"));
        assert!(text.contains("unable to parse audio URL"));
        assert!(text.contains("unable to parse track number 'three'"));
        assert!(text.contains("unable to parse date date '2015-02-30'"));
    }

    #[test]
    fn test_stand_alone() {
        let mut msg = valid_message();
        assert!(!msg.is_stand_alone());

        msg.set_series(Vec::<String>::new());
        assert!(msg.is_stand_alone());

        for name in ["SAM", "stand alone", "STaND ALoNe MeSSaGe"] {
            msg.set_series([name]);
            assert!(msg.is_stand_alone(), "{name} should be stand-alone");
        }

        msg.set_series(["sam", "SERIES"]);
        assert!(!msg.is_stand_alone());
    }

    #[test]
    fn test_normalize_titles_speakers() {
        let mut msg = Message::from_row(&row());
        msg.normalize();
        assert_eq!(msg.speakers, vec!["Pastor Vern Peltz", "Guest"]);
    }

    #[test]
    fn test_undated_sort_last() {
        let a = Message::new("a", NaiveDate::from_ymd_opt(2015, 1, 1));
        let b = Message::new("b", NaiveDate::from_ymd_opt(2016, 1, 1));
        let c = Message::new("c", None);
        let mut list = vec![c.clone(), b.clone(), a.clone()];
        list.sort_by(Message::by_date);
        assert_eq!(list, vec![a.clone(), b.clone(), c.clone()]);
        list.sort_by(Message::by_date_descending);
        assert_eq!(list, vec![b, a, c]);
    }
}
