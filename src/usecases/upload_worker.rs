//! Uploads a rendered site directory to an ObjectStore.
//!
//! Fixed-size worker pool: one task per file, at most `workers` in flight.
//! Every file is attempted; failures are collected, not fatal.

use crate::adapters::storage::content_type_for;
use crate::domain::DomainError;
use crate::ports::ObjectStore;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

pub const DEFAULT_UPLOAD_WORKERS: usize = 4;

pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    workers: usize,
    show_progress: bool,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, workers: usize) -> Self {
        Self {
            store,
            workers: workers.max(1),
            show_progress: true,
        }
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        let style = ProgressStyle::with_template("{spinner} uploading [{bar:40}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }

    /// Upload every file under `root`. Keys are paths relative to `root`
    /// with `/` separators. Returns once every upload has finished.
    pub async fn upload_dir(&self, root: &Path) -> Result<UploadReport, DomainError> {
        let files = collect_files(root).await?;
        info!(root = %root.display(), files = files.len(), workers = self.workers, "starting upload");

        let bar = self.progress_bar(files.len() as u64);
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for path in files {
            let key = object_key(root, &path);
            let store = Arc::clone(&self.store);
            let sem = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let result = match sem.acquire_owned().await {
                    Ok(_permit) => upload_one(&*store, &path, &key).await,
                    Err(e) => Err(DomainError::Storage(e.to_string())),
                };
                (key, result)
            });
        }

        let mut report = UploadReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, Ok(()))) => {
                    bar.set_message(key.clone());
                    report.uploaded.push(key);
                }
                Ok((key, Err(e))) => {
                    error!(key = %key, error = %e, "upload failed");
                    report.failed.push((key, e.to_string()));
                }
                Err(e) => {
                    error!(error = %e, "upload task panicked");
                    report.failed.push(("<task>".to_string(), e.to_string()));
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        report.uploaded.sort();
        report.failed.sort();
        info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "upload finished"
        );
        Ok(report)
    }
}

async fn upload_one(store: &dyn ObjectStore, path: &Path, key: &str) -> Result<(), DomainError> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::Storage(format!("{}: {}", path.display(), e)))?;
    store.put_object(key, body, content_type_for(key)).await
}

fn object_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every regular file below `root`, depth first, sorted.
async fn collect_files(root: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| DomainError::Storage(format!("{}: {}", dir.display(), e)))?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Outcome of one upload run.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    /// `(key, error)` for every file that could not be stored.
    pub failed: Vec<(String, String)>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
