//! Catalog load: fetch tables -> check columns -> build, validate and
//! normalize messages -> build series, discover members, validate, normalize.
//!
//! - Missing tables or columns abort the load
//! - Invalid rows are logged and dropped; the load continues

use crate::domain::message::MESSAGE_COLUMNS;
use crate::domain::series::SERIES_COLUMNS;
use crate::domain::{Catalog, DomainError, Message, Series, Table};
use crate::ports::SheetSource;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_MESSAGES_TABLE: &str = "Messages";
pub const DEFAULT_SERIES_TABLE: &str = "Series";

/// Loader. Reads both tables through a SheetSource.
pub struct CatalogLoader {
    sheets: Arc<dyn SheetSource>,
    messages_table: String,
    series_table: String,
}

impl CatalogLoader {
    pub fn new(sheets: Arc<dyn SheetSource>) -> Self {
        Self {
            sheets,
            messages_table: DEFAULT_MESSAGES_TABLE.to_string(),
            series_table: DEFAULT_SERIES_TABLE.to_string(),
        }
    }

    pub fn with_tables(mut self, messages: impl Into<String>, series: impl Into<String>) -> Self {
        self.messages_table = messages.into();
        self.series_table = series.into();
        self
    }

    /// Build the catalog from scratch.
    pub async fn load(&self) -> Result<(Catalog, LoadStats), DomainError> {
        let messages = self.sheets.fetch_table(&self.messages_table).await?;
        messages.require_columns(MESSAGE_COLUMNS)?;
        let series = self.sheets.fetch_table(&self.series_table).await?;
        series.require_columns(SERIES_COLUMNS)?;

        let (catalog, stats) = build_catalog(&messages, &series);
        info!(
            messages = stats.messages_kept,
            messages_dropped = stats.messages_dropped,
            series = stats.series_kept,
            series_dropped = stats.series_dropped,
            "catalog loaded"
        );
        Ok((catalog, stats))
    }
}

/// Build a catalog from already-checked tables. Messages first: series
/// discovery needs every valid message.
pub fn build_catalog(messages: &Table, series: &Table) -> (Catalog, LoadStats) {
    let mut stats = LoadStats {
        rows_read: messages.rows.len() + series.rows.len(),
        ..Default::default()
    };
    let mut catalog = Catalog::new();

    for row in &messages.rows {
        let mut msg = Message::from_row(row);
        let report = msg.validate();
        report.log();
        if !report.is_valid() {
            warn!("Ignoring message due to preceding problems");
            stats.messages_dropped += 1;
            continue;
        }
        msg.normalize();
        catalog.add_message(msg);
        stats.messages_kept += 1;
    }

    let all_messages: Vec<Arc<Message>> = catalog.raw_messages().to_vec();
    let mut seen_ids = HashSet::new();
    for row in &series.rows {
        let mut s = Series::from_row(row);
        let found = s.discover_messages(&all_messages);
        debug!(series = s.title.as_deref().unwrap_or_default(), found, "discovered messages");

        let report = s.validate(&mut seen_ids);
        report.log();
        if !report.is_valid() {
            warn!("Ignoring series due to preceding problems");
            stats.series_dropped += 1;
            continue;
        }
        s.normalize();
        catalog.add_series(s);
        stats.series_kept += 1;
    }

    (catalog, stats)
}

/// Result of a catalog load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub messages_kept: usize,
    pub messages_dropped: usize,
    pub series_kept: usize,
    pub series_dropped: usize,
}
