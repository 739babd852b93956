//! Application configuration. Sheet location, output, page sets, upload.

use crate::domain::AccessLevel;
use crate::usecases::load_service::{DEFAULT_MESSAGES_TABLE, DEFAULT_SERIES_TABLE};
use crate::usecases::publish_service::{PageSet, DEFAULT_RECENT_DAYS};
use crate::usecases::upload_worker::DEFAULT_UPLOAD_WORKERS;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory of CSV exports (`<name>.csv`). Read from CATALOG_SHEET_DIR.
    #[serde(default)]
    pub sheet_dir: Option<String>,

    /// Base URL of published CSV exports. Wins over `sheet_dir`. Read from CATALOG_SHEET_URL.
    #[serde(default)]
    pub sheet_url: Option<String>,

    #[serde(default)]
    pub messages_table: Option<String>,

    #[serde(default)]
    pub series_table: Option<String>,

    /// Where rendered pages are written. Read from CATALOG_OUTPUT_DIR.
    #[serde(default)]
    pub output_dir: Option<String>,

    /// Days a message counts as recent (default 60).
    #[serde(default)]
    pub recent_days: Option<i64>,

    /// Comma-separated visibilities to publish, e.g. "public,protected".
    #[serde(default)]
    pub visibilities: Option<String>,

    /// Comma-separated ministries. Unset publishes one combined catalog.
    #[serde(default)]
    pub ministries: Option<String>,

    /// Page skin, applied as the body class.
    #[serde(default)]
    pub skin: Option<String>,

    /// Page wrapper template using `{{ content }}`, from a file or a URL.
    #[serde(default)]
    pub template_path: Option<String>,

    #[serde(default)]
    pub template_url: Option<String>,

    /// Mirror directory the upload step copies the site into.
    #[serde(default)]
    pub upload_dir: Option<String>,

    /// S3 bucket for uploads (requires the `s3` feature). Read from CATALOG_S3_BUCKET.
    #[serde(default)]
    pub s3_bucket: Option<String>,

    #[serde(default)]
    pub s3_prefix: Option<String>,

    /// Concurrent uploads (default 4).
    #[serde(default)]
    pub upload_workers: Option<usize>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("CATALOG"));
        if let Ok(path) = std::env::var("CATALOG_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn sheet_dir_or_default(&self) -> String {
        self.sheet_dir.clone().unwrap_or_else(|| "./sheets".to_string())
    }

    pub fn messages_table_or_default(&self) -> String {
        self.messages_table
            .clone()
            .unwrap_or_else(|| DEFAULT_MESSAGES_TABLE.to_string())
    }

    pub fn series_table_or_default(&self) -> String {
        self.series_table
            .clone()
            .unwrap_or_else(|| DEFAULT_SERIES_TABLE.to_string())
    }

    pub fn output_dir_or_default(&self) -> String {
        self.output_dir.clone().unwrap_or_else(|| "./site".to_string())
    }

    pub fn recent_days_or_default(&self) -> i64 {
        self.recent_days.unwrap_or(DEFAULT_RECENT_DAYS)
    }

    pub fn upload_workers_or_default(&self) -> usize {
        self.upload_workers.unwrap_or(DEFAULT_UPLOAD_WORKERS)
    }

    /// Configured visibilities, or public and protected.
    pub fn visibilities_or_default(&self) -> Result<Vec<AccessLevel>, String> {
        match &self.visibilities {
            Some(list) => split_list(list).map(|v| v.parse()).collect(),
            None => Ok(vec![AccessLevel::Public, AccessLevel::Protected]),
        }
    }

    /// Configured ministries. Empty means one combined catalog.
    pub fn ministry_list(&self) -> Vec<String> {
        self.ministries
            .as_deref()
            .map(|list| split_list(list).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Every (visibility, ministry) pair to publish.
    pub fn page_sets(&self) -> Result<Vec<PageSet>, String> {
        let ministries = self.ministry_list();
        let mut sets = Vec::new();
        for visibility in self.visibilities_or_default()? {
            if ministries.is_empty() {
                sets.push(PageSet {
                    visibility,
                    ministry: None,
                });
            }
            for ministry in &ministries {
                sets.push(PageSet {
                    visibility,
                    ministry: Some(ministry.clone()),
                });
            }
        }
        Ok(sets)
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}
