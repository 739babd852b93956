//! Named links (handouts, booklets, study guides) and link parsing.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use url::Url;

/// Cell values that mean "no link on purpose" rather than a malformed URL.
pub const ABSENT_LINK_MARKERS: &[&str] = &[
    "-",
    "n/a",
    "n/e",
    "abrogated",
    "source",
    "in progress",
    "editing",
    "edited",
    "rendering",
    "rendered",
    "flash",
    "uploading",
];

pub fn is_absent_marker(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    ABSENT_LINK_MARKERS.contains(&value.as_str())
}

/// Parse an optional link cell. `Ok(None)` for blanks and absent markers.
pub fn parse_link(value: Option<&str>, what: &str) -> Result<Option<Url>, String> {
    let Some(value) = value else {
        return Ok(None);
    };
    if is_absent_marker(value) {
        return Ok(None);
    }
    Url::parse(value.trim())
        .map(Some)
        .map_err(|e| format!("unable to parse {} URL '{}': {}", what, value, e))
}

/// Series a resource was listed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesRef {
    pub id: Option<String>,
    pub title: Option<String>,
}

/// Message a resource was attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRef {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Where a resource came from. Never ownership: many resources may point at
/// the same series or message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub series: Option<SeriesRef>,
    pub message: Option<MessageRef>,
}

impl Provenance {
    pub fn is_empty(&self) -> bool {
        self.series.is_none() && self.message.is_none()
    }
}

/// A `(display name, URL)` pair with optional provenance.
///
/// Equality and hashing use name and link only; provenance is ignored so the
/// same handout reached through two paths deduplicates.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub name: String,
    pub link: Url,
    #[serde(skip_serializing_if = "Provenance::is_empty")]
    pub source: Provenance,
}

impl Resource {
    pub fn new(name: impl Into<String>, link: Url) -> Self {
        Self {
            name: name.into(),
            link,
            source: Provenance::default(),
        }
    }

    /// Parse one serialized link. Accepted shapes:
    /// `link`, `name|link`, `link (name)`, `link <name>`.
    pub fn parse(s: &str) -> Result<Self, url::ParseError> {
        let s = s.trim();
        if let Some((name, link)) = s.split_once('|') {
            return Ok(Self::new(name.trim(), Url::parse(link.trim())?));
        }
        for (open, close) in [('(', ')'), ('<', '>')] {
            if let Some((link, name)) = split_name_suffix(s, open, close) {
                return Ok(Self::new(name.trim(), Url::parse(link.trim())?));
            }
        }
        let link = Url::parse(s)?;
        let name = name_from_link(&link);
        Ok(Self::new(name, link))
    }

    pub fn with_series(mut self, series: SeriesRef) -> Self {
        self.source.series = Some(series);
        self
    }

    pub fn with_message(mut self, message: MessageRef) -> Self {
        self.source.message = Some(message);
        self
    }

    /// Same name and link, provenance dropped.
    pub fn without_provenance(&self) -> Self {
        Self::new(self.name.clone(), self.link.clone())
    }

    /// True when the link path ends in a file with an extension (pdf, docx, ...).
    pub fn is_document(&self) -> bool {
        let file = self
            .link
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("");
        match file.rsplit_once('.') {
            Some((stem, ext)) => {
                !stem.is_empty()
                    && (1..=5).contains(&ext.len())
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            }
            None => false,
        }
    }

    /// Ordering key: case-folded, with a leading date and a leading
    /// article ("A", "An", "The") skipped.
    pub fn sort_key(&self) -> String {
        sort_key(&self.name)
    }

    /// Display-name ordering used by the resource and booklet lists.
    pub fn by_name(a: &Resource, b: &Resource) -> Ordering {
        a.sort_key()
            .cmp(&b.sort_key())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.link.as_str().cmp(b.link.as_str()))
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.link == other.link
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.link.as_str().hash(state);
    }
}

/// Split `link (name)` at the first opener preceded by whitespace. The
/// closer must end the string, so `.../Acts_(book)` stays one link.
fn split_name_suffix(s: &str, open: char, close: char) -> Option<(&str, &str)> {
    let inner = s.strip_suffix(close)?;
    let start = inner
        .match_indices(open)
        .map(|(i, _)| i)
        .find(|&i| inner[..i].ends_with(char::is_whitespace))?;
    Some((&inner[..start], &inner[start + open.len_utf8()..]))
}

/// Parse a semicolon-separated list of resources. Bad entries are collected
/// into a single error string; good entries are still returned.
pub fn parse_resource_list(value: Option<&str>) -> (Vec<Resource>, Option<String>) {
    let Some(value) = value else {
        return (Vec::new(), None);
    };
    if is_absent_marker(value) {
        return (Vec::new(), None);
    }

    let mut resources = Vec::new();
    let mut bad = Vec::new();
    for part in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        match Resource::parse(part) {
            Ok(resource) => resources.push(resource),
            Err(e) => bad.push(format!("'{}' ({})", part, e)),
        }
    }

    let error = if bad.is_empty() {
        None
    } else {
        Some(format!("unable to parse the resource URLs: {}", bad.join(", ")))
    };
    (resources, error)
}

fn name_from_link(link: &Url) -> String {
    let file = link
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");
    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };
    let name = stem.replace('+', " ").replace("%20", " ");
    if name.trim().is_empty() {
        link.host_str().unwrap_or_default().to_string()
    } else {
        name.trim().to_string()
    }
}

fn sort_key(name: &str) -> String {
    let mut rest = name.trim().to_lowercase();

    // leading date such as "2015-03-01" or "3/1/2015", then separators
    let date_len = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '/' || c == '.'))
        .unwrap_or(rest.len());
    let prefix = &rest[..date_len];
    if prefix.chars().filter(|c| c.is_ascii_digit()).count() >= 4
        && prefix.contains(|c: char| c == '-' || c == '/' || c == '.')
    {
        rest = rest[date_len..]
            .trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == ':')
            .to_string();
    }

    for article in ["the ", "an ", "a "] {
        if let Some(stripped) = rest.strip_prefix(article) {
            rest = stripped.trim_start().to_string();
            break;
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUIDE: &str =
        "https://s3-us-west-2.amazonaws.com/wordoflife.mn.audio/StudyGuide/Pastors+1990+Dream.pdf";

    #[test]
    fn test_parse_bare_link_derives_name() {
        let r = Resource::parse(GUIDE).unwrap();
        assert_eq!(r.name, "Pastors 1990 Dream");
        assert!(r.is_document());
    }

    #[test]
    fn test_parse_named_shapes() {
        let piped = Resource::parse("Study Guide | http://example.com/guide.pdf").unwrap();
        assert_eq!(piped.name, "Study Guide");
        assert_eq!(piped.link.as_str(), "http://example.com/guide.pdf");

        let paren = Resource::parse("http://example.com/guide.pdf (Guide)").unwrap();
        assert_eq!(paren.name, "Guide");

        let angle = Resource::parse("http://example.com/guide.pdf <Notes>").unwrap();
        assert_eq!(angle.name, "Notes");
    }

    #[test]
    fn test_parenthesised_url_is_one_link() {
        let bare = Resource::parse("https://en.wikipedia.org/wiki/Acts_(book)").unwrap();
        assert_eq!(bare.link.as_str(), "https://en.wikipedia.org/wiki/Acts_(book)");
        assert_eq!(bare.name, "Acts_(book)");

        let named = Resource::parse("https://en.wikipedia.org/wiki/Acts_(book) (Book of Acts)").unwrap();
        assert_eq!(named.link.as_str(), "https://en.wikipedia.org/wiki/Acts_(book)");
        assert_eq!(named.name, "Book of Acts");
    }

    #[test]
    fn test_site_links_are_not_documents() {
        assert!(!Resource::parse("http://youtu.be/ygUSyQptiLQ").unwrap().is_document());
        assert!(!Resource::parse("http://www.endtime.com/").unwrap().is_document());
        assert_eq!(Resource::parse("http://www.endtime.com/").unwrap().name, "www.endtime.com");
    }

    #[test]
    fn test_equality_ignores_provenance() {
        let plain = Resource::parse(GUIDE).unwrap();
        let tagged = plain.clone().with_series(SeriesRef {
            id: Some("S1".into()),
            title: Some("Series".into()),
        });
        assert_eq!(plain, tagged);
        assert!(tagged.without_provenance().source.is_empty());
    }

    #[test]
    fn test_resource_list_collects_errors() {
        let (ok, err) = parse_resource_list(Some("http://a.com/x.pdf; not a url ;http://b.com/y.pdf"));
        assert_eq!(ok.len(), 2);
        let err = err.unwrap();
        assert!(err.contains("'not a url'"));

        let (none, err) = parse_resource_list(Some("n/a"));
        assert!(none.is_empty());
        assert!(err.is_none());
    }

    #[test]
    fn test_parse_link_markers() {
        assert_eq!(parse_link(Some("rendering"), "audio"), Ok(None));
        assert_eq!(parse_link(None, "audio"), Ok(None));
        let err = parse_link(Some("NOT A URL"), "audio").unwrap_err();
        assert!(err.starts_with("unable to parse audio URL 'NOT A URL'"));
    }

    #[test]
    fn test_sort_key_skips_articles_and_dates() {
        assert_eq!(sort_key("The Book of Acts"), "book of acts");
        assert_eq!(sort_key("A Prayer Guide"), "prayer guide");
        assert_eq!(sort_key("2015-03-01 Easter Handout"), "easter handout");
        assert_eq!(sort_key("Theology"), "theology");
        assert_eq!(sort_key("1990 Dream"), "1990 dream");
    }
}
