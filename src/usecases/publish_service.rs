//! Publish: one page set per (visibility, ministry).
//!
//! Every view is built with its own FilterChain. Pages land under
//! `<output>/<visibility>/<ministry>/` and `manifest.json` lists them all.

use crate::domain::page::slug;
use crate::domain::series::sort_series_by_date;
use crate::domain::{
    AccessLevel, Catalog, CatalogFilter, DomainError, FilterChain, Page, PageBody, SeriesEntry, TagSet,
    YearMode,
};
use crate::ports::PageRenderer;
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

pub const DEFAULT_RECENT_DAYS: i64 = 60;

/// Directory name used when a page set spans every ministry.
pub const ALL_MINISTRIES: &str = "all";

/// Which slice of the catalog a page set shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSet {
    pub visibility: AccessLevel,
    pub ministry: Option<String>,
}

impl PageSet {
    /// Base chain shared by every view of the set.
    pub fn chain(&self) -> FilterChain {
        let chain = FilterChain::new().with(CatalogFilter::visibility(self.visibility));
        match &self.ministry {
            Some(m) => chain.with(CatalogFilter::ministries(TagSet::new().with([m.clone()]))),
            None => chain,
        }
    }

    /// `<visibility>/<ministry>`
    pub fn dir(&self) -> String {
        let ministry = self
            .ministry
            .as_deref()
            .map(slug)
            .unwrap_or_else(|| ALL_MINISTRIES.to_string());
        format!("{}/{}", self.visibility.as_str(), ministry)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub path: String,
    pub title: String,
    pub kind: &'static str,
    pub visibility: AccessLevel,
    pub ministry: Option<String>,
    pub entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub generated: NaiveDate,
    pub pages: Vec<ManifestEntry>,
}

pub struct PublishService {
    renderer: Arc<dyn PageRenderer>,
    output_dir: PathBuf,
    recent_days: i64,
    today: NaiveDate,
}

impl PublishService {
    pub fn new(renderer: Arc<dyn PageRenderer>, output_dir: impl AsRef<Path>, recent_days: i64) -> Self {
        Self {
            renderer,
            output_dir: output_dir.as_ref().to_path_buf(),
            recent_days,
            today: Local::now().date_naive(),
        }
    }

    /// Pin "today" for the recent window.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Page models for one set. Paths are relative to the set's directory.
    /// When two series slug to the same path the first one keeps it.
    pub fn pages(&self, catalog: &Catalog, set: &PageSet) -> Vec<Page> {
        let base = set.chain();
        let mut pages = Vec::new();

        let recent_chain = base
            .clone()
            .with(CatalogFilter::recent_from(self.recent_days, self.today));
        let recent = catalog.recent_messages(&recent_chain);
        pages.push(
            Page::new("recent.html", "Recent Messages", PageBody::MessageList(recent.messages))
                .with_description(recent.description),
        );

        let mut index = catalog.in_progress_series(&base);
        index.extend(catalog.completed_series_with_stand_alone_messages(&base));
        let mut paths = HashSet::new();
        for series in &index {
            let path = Page::series_path(series);
            if !paths.insert(path.clone()) {
                warn!(
                    set = %set.dir(),
                    path = %path,
                    series = series.id.as_deref().unwrap_or_default(),
                    "series page path already taken, skipping"
                );
                continue;
            }
            let title = series.title.clone().unwrap_or_default();
            let body = PageBody::SeriesDetail {
                series: Arc::clone(series),
                messages: series.visible_messages(&base),
            };
            pages.push(Page::new(path, title, body).with_description(series.description.clone()));
        }
        pages.push(Page::new(
            "index.html",
            "Message Catalog",
            PageBody::SeriesIndex {
                promo: SeriesEntry::list(catalog.recent_series(&recent_chain), &base),
                series: SeriesEntry::list(index, &base),
            },
        ));

        for year in self.years(catalog, &base) {
            let year_chain = base
                .clone()
                .with(CatalogFilter::booklets(false))
                .with(CatalogFilter::year(year, YearMode::IntersectingWith));
            let mut list = catalog.filtered_series(&year_chain);
            list.extend(catalog.stand_alone_messages(&base, year).map(Arc::new));
            sort_series_by_date(&mut list, false);
            pages.push(Page::new(
                format!("years/{}.html", year),
                format!("Messages from {}", year),
                PageBody::series_index(SeriesEntry::list(list, &base)),
            ));
        }

        pages.push(Page::new(
            "resources.html",
            "Handouts and Resources",
            PageBody::ResourceList(catalog.handouts_and_resources(&base)),
        ));
        pages.push(Page::new(
            "booklets.html",
            "Booklets",
            PageBody::ResourceList(catalog.booklets(&base)),
        ));
        pages
    }

    /// Years with at least one series or stand-alone message in the set.
    fn years(&self, catalog: &Catalog, chain: &FilterChain) -> BTreeSet<i32> {
        let mut years: BTreeSet<i32> = catalog
            .filtered_series(chain)
            .iter()
            .filter(|s| !s.is_booklet())
            .flat_map(|s| [s.start_date, s.end_date])
            .flatten()
            .map(|d| d.year())
            .collect();
        years.extend(
            catalog
                .messages(chain)
                .iter()
                .filter(|m| m.is_stand_alone())
                .filter_map(|m| m.date)
                .map(|d| d.year()),
        );
        years
    }

    /// Render and write every page set, then the manifest.
    pub async fn publish(&self, catalog: &Catalog, sets: &[PageSet]) -> Result<Manifest, DomainError> {
        let mut manifest = Manifest {
            generated: self.today,
            pages: Vec::new(),
        };

        for set in sets {
            let dir = set.dir();
            let pages = self.pages(catalog, set);
            for page in &pages {
                let html = self.renderer.render(page)?;
                let rel = format!("{}/{}", dir, page.path);
                self.write(&rel, html.as_bytes()).await?;
                debug!(path = %rel, entries = page.body.len(), "wrote page");
                manifest.pages.push(ManifestEntry {
                    path: rel,
                    title: page.title.clone(),
                    kind: page.body.kind(),
                    visibility: set.visibility,
                    ministry: set.ministry.clone(),
                    entries: page.body.len(),
                });
            }
            info!(set = %dir, pages = pages.len(), "published page set");
        }

        let json = serde_json::to_vec_pretty(&manifest).map_err(|e| DomainError::Render(e.to_string()))?;
        self.write("manifest.json", &json).await?;
        info!(
            output = %self.output_dir.display(),
            pages = manifest.pages.len(),
            "publish finished"
        );
        Ok(manifest)
    }

    async fn write(&self, rel: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let path = self.output_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        Ok(())
    }
}
