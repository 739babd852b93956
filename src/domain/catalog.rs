//! The catalog aggregate: raw messages and series plus the filtered views
//! the publisher renders.
//!
//! Every view takes the [`FilterChain`] for the page being built. The
//! catalog itself holds no filter state.

use crate::domain::filters::{CatalogFilter, FilterChain};
use crate::domain::message::Message;
use crate::domain::resource::Resource;
use crate::domain::series::{sort_series_by_date, without_duplicates, Series};
use chrono::Datelike;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;

/// Years scanned when grouping stand-alone messages by year.
pub const STAND_ALONE_YEARS: std::ops::RangeInclusive<i32> = 2000..=2029;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: Vec<Arc<Message>>,
    series: Vec<Arc<Series>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: impl Into<Arc<Message>>) {
        self.messages.push(message.into());
    }

    pub fn add_series(&mut self, series: impl Into<Arc<Series>>) {
        self.series.push(series.into());
    }

    /// Every message, regardless of filters.
    pub fn raw_messages(&self) -> &[Arc<Message>] {
        &self.messages
    }

    /// Every series, regardless of filters.
    pub fn raw_series(&self) -> &[Arc<Series>] {
        &self.series
    }

    pub fn messages(&self, chain: &FilterChain) -> Vec<Arc<Message>> {
        self.messages
            .iter()
            .filter(|m| chain.includes_message(m))
            .cloned()
            .collect()
    }

    pub fn filtered_series(&self, chain: &FilterChain) -> Vec<Arc<Series>> {
        self.series
            .iter()
            .filter(|s| chain.includes_series(s))
            .cloned()
            .collect()
    }

    /// Finished series, oldest first. Booklet-only series are left out.
    pub fn completed_series(&self, chain: &FilterChain) -> Vec<Arc<Series>> {
        let mut list: Vec<_> = self
            .filtered_series(chain)
            .into_iter()
            .filter(|s| s.end_date.is_some() && !s.is_booklet())
            .collect();
        sort_series_by_date(&mut list, false);
        list
    }

    /// Series without an end date, newest first.
    pub fn in_progress_series(&self, chain: &FilterChain) -> Vec<Arc<Series>> {
        let mut list: Vec<_> = self
            .filtered_series(chain)
            .into_iter()
            .filter(|s| s.end_date.is_none() && !s.is_booklet())
            .collect();
        sort_series_by_date(&mut list, true);
        list
    }

    /// Series still running or ended on or after the chain's recent cutoff,
    /// newest first. Booklet-only series are left out. Without a recent
    /// filter in `chain` every non-booklet series qualifies.
    pub fn recent_series(&self, chain: &FilterChain) -> Vec<Arc<Series>> {
        let mut list: Vec<_> = self
            .filtered_series(chain)
            .into_iter()
            .filter(|s| !s.is_booklet())
            .collect();
        sort_series_by_date(&mut list, true);
        list
    }

    fn stand_alone(&self, chain: &FilterChain) -> Vec<Arc<Message>> {
        let mut list: Vec<_> = self
            .messages(chain)
            .into_iter()
            .filter(|m| m.is_stand_alone())
            .collect();
        list.sort_by(|a, b| Message::by_date(a, b));
        list
    }

    /// One single-message pseudo-series per qualifying stand-alone message,
    /// oldest first.
    pub fn stand_alone_messages_by_message(&self, chain: &FilterChain) -> Vec<Arc<Series>> {
        self.stand_alone(chain)
            .into_iter()
            .map(|message| {
                let series = Series {
                    id: Some(stand_alone_id(&message)),
                    title: message.title.clone(),
                    description: message.description.clone(),
                    speakers: message.speakers.clone(),
                    visibility: message.visibility,
                    start_date: message.date,
                    end_date: message.date,
                    messages: vec![message],
                    ..Default::default()
                };
                Arc::new(series)
            })
            .collect()
    }

    /// Stand-alone messages of one year as a pseudo-series, oldest first.
    /// `None` when the year has no qualifying message.
    pub fn stand_alone_messages(&self, chain: &FilterChain, year: i32) -> Option<Series> {
        let messages: Vec<_> = self
            .stand_alone(chain)
            .into_iter()
            .filter(|m| m.date.is_some_and(|d| d.year() == year))
            .collect();
        let first = messages.first()?.date;
        let last = messages.last()?.date;

        Some(Series {
            id: Some(format!("SA-{}", year)),
            title: Some(format!("Messages from {} that are not part of a series", year)),
            description: Some(format!("Messages from {} that were not part of any series.", year)),
            visibility: Some(chain.visibility()),
            start_date: first,
            end_date: last,
            messages,
            ..Default::default()
        })
    }

    /// One pseudo-series per year that has stand-alone messages.
    pub fn stand_alone_messages_by_year(&self, chain: &FilterChain) -> Vec<Arc<Series>> {
        STAND_ALONE_YEARS
            .filter_map(|year| self.stand_alone_messages(chain, year))
            .map(Arc::new)
            .collect()
    }

    /// Qualifying messages, newest first, as one pseudo-series. Pair the
    /// chain with a [`CatalogFilter::Recent`] to bound it.
    pub fn recent_messages(&self, chain: &FilterChain) -> Series {
        let mut messages = self.messages(chain);
        messages.sort_by(|a, b| Message::by_date_descending(a, b));

        let description = chain
            .filters()
            .iter()
            .find_map(|f| match f {
                CatalogFilter::Recent { cutoff } => {
                    Some(format!("Messages since {}.", cutoff.format("%B %-d, %Y")))
                }
                _ => None,
            })
            .unwrap_or_else(|| "Recent messages.".to_string());

        Series {
            id: Some("RECENT".to_string()),
            title: Some("Recent Messages".to_string()),
            description: Some(description),
            visibility: Some(chain.visibility()),
            start_date: messages.last().and_then(|m| m.date),
            end_date: messages.first().and_then(|m| m.date),
            messages,
            ..Default::default()
        }
    }

    /// Stand-alone year groups followed by the completed series.
    pub fn completed_series_with_stand_alone_messages(&self, chain: &FilterChain) -> Vec<Arc<Series>> {
        let mut all = self.stand_alone_messages_by_year(chain);
        all.extend(self.completed_series(chain));
        without_duplicates(all)
    }

    /// Resources of qualifying series (with those of their qualifying
    /// members) and of qualifying stand-alone messages, minus booklets.
    pub fn handouts_and_resources(&self, chain: &FilterChain) -> Vec<Resource> {
        let mut all = Vec::new();

        for series in self.filtered_series(chain) {
            if series.is_booklet() {
                continue;
            }
            all.extend(series.resources.iter().cloned());
            let listed_under = series.source_ref();
            for message in series.visible_messages(chain) {
                let from = message.source_ref();
                all.extend(message.resources.iter().map(|r| {
                    r.clone()
                        .with_message(from.clone())
                        .with_series(listed_under.clone())
                }));
            }
        }

        for message in self.stand_alone(chain) {
            all.extend(message.resources.iter().cloned());
        }

        let booklets: HashSet<Resource> = self.booklets(chain).into_iter().collect();
        let mut seen = HashSet::new();
        all.retain(|r| !booklets.contains(r) && seen.insert(r.clone()));
        all.sort_by(Resource::by_name);
        all
    }

    /// Booklets of every series. A booklet whose series does not qualify
    /// under `chain` loses its provenance.
    pub fn booklets(&self, chain: &FilterChain) -> Vec<Resource> {
        let mut all: Vec<Resource> = self
            .series
            .iter()
            .flat_map(|series| {
                let visible = chain.includes_series(series);
                series.booklets.iter().map(move |b| {
                    if visible {
                        b.clone()
                    } else {
                        b.without_provenance()
                    }
                })
            })
            .collect();
        all.sort_by(Resource::by_name);
        all
    }
}

/// Deterministic id for a stand-alone message's pseudo-series.
fn stand_alone_id(message: &Message) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message.title.as_deref().unwrap_or_default());
    hasher.update(b"|");
    if let Some(date) = message.date {
        hasher.update(date.to_string());
    }
    let digest = hasher.finalize();
    let hex: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("SAM-{}", hex)
}
