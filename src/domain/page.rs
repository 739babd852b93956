//! Page models handed to a [`crate::ports::PageRenderer`].

use crate::domain::filters::FilterChain;
use crate::domain::message::Message;
use crate::domain::resource::Resource;
use crate::domain::series::Series;
use serde::Serialize;
use std::sync::Arc;

/// A series as listed on an index page. `visible_messages` counts only the
/// members the page's chain lets through.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesEntry {
    pub series: Arc<Series>,
    pub visible_messages: usize,
}

impl SeriesEntry {
    pub fn new(series: Arc<Series>, chain: &FilterChain) -> Self {
        let visible_messages = series.visible_messages(chain).len();
        Self {
            series,
            visible_messages,
        }
    }

    pub fn list(series: Vec<Arc<Series>>, chain: &FilterChain) -> Vec<Self> {
        series.into_iter().map(|s| Self::new(s, chain)).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum PageBody {
    /// Series summaries linking to their detail pages. `promo` is shown
    /// first and is empty on most indexes.
    SeriesIndex {
        promo: Vec<SeriesEntry>,
        series: Vec<SeriesEntry>,
    },
    /// One series with the members visible on this page.
    SeriesDetail {
        series: Arc<Series>,
        messages: Vec<Arc<Message>>,
    },
    MessageList(Vec<Arc<Message>>),
    ResourceList(Vec<Resource>),
}

impl PageBody {
    pub fn series_index(series: Vec<SeriesEntry>) -> Self {
        Self::SeriesIndex {
            promo: Vec::new(),
            series,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::SeriesIndex { .. } => "series_index",
            Self::SeriesDetail { .. } => "series_detail",
            Self::MessageList(_) => "message_list",
            Self::ResourceList(_) => "resource_list",
        }
    }

    /// Number of entries shown.
    pub fn len(&self) -> usize {
        match self {
            Self::SeriesIndex { series, .. } => series.len(),
            Self::SeriesDetail { messages, .. } => messages.len(),
            Self::MessageList(list) => list.len(),
            Self::ResourceList(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One output page. `path` is relative to the page set's directory.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub path: String,
    pub title: String,
    pub description: Option<String>,
    pub body: PageBody,
}

impl Page {
    pub fn new(path: impl Into<String>, title: impl Into<String>, body: PageBody) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            description: None,
            body,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Relative path of a series' detail page.
    pub fn series_path(series: &Series) -> String {
        format!("series/{}.html", slug(series.id.as_deref().unwrap_or("series")))
    }
}

/// Lowercase file-name-safe form of an identifier.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "page".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("WOLS-SA2014"), "wols-sa2014");
        assert_eq!(slug("  Acts & Facts! "), "acts-facts");
        assert_eq!(slug("***"), "page");
    }

    #[test]
    fn test_entry_counts_visible_members_only() {
        use crate::domain::{AccessLevel, CatalogFilter};

        let mut public = Message::new("Open", None);
        public.visibility = Some(AccessLevel::Public);
        let mut private = Message::new("Closed", None);
        private.visibility = Some(AccessLevel::Private);
        let mut series = Series::new("S1", "Mixed");
        series.visibility = Some(AccessLevel::Public);
        series.messages = vec![Arc::new(public), Arc::new(private)];

        let chain = FilterChain::new().with(CatalogFilter::visibility(AccessLevel::Public));
        let entry = SeriesEntry::new(Arc::new(series), &chain);
        assert_eq!(entry.visible_messages, 1);
        assert_eq!(entry.series.message_count(), 2);
    }

    #[test]
    fn test_series_path() {
        let series = Series::new("SA-2015", "Stand alone");
        assert_eq!(Page::series_path(&series), "series/sa-2015.html");
    }
}
