//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run.
//! No business logic here.
//!
//! Usage: `sermon-catalog [check|publish|upload]` (default `publish`).

use dotenv::dotenv;
use sermon_catalog::adapters::render::{HtmlRenderer, PageTemplate};
use sermon_catalog::adapters::sheets::{CsvDirSource, HttpCsvSource};
use sermon_catalog::adapters::storage::DirStore;
use sermon_catalog::ports::{ObjectStore, PageRenderer, SheetSource};
use sermon_catalog::shared::config::AppConfig;
use sermon_catalog::usecases::{CatalogLoader, PublishService, Uploader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Check,
    Publish,
    Upload,
}

fn parse_command() -> anyhow::Result<Command> {
    match std::env::args().nth(1).as_deref() {
        None | Some("publish") => Ok(Command::Publish),
        Some("check") => Ok(Command::Check),
        Some("upload") => Ok(Command::Upload),
        Some(other) => anyhow::bail!("unknown command '{}'; expected check, publish or upload", other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = &env_loaded {
        info!(path = %path.display(), "loaded .env");
    }

    let command = parse_command()?;
    let cfg = AppConfig::load()?;

    // --- Row source: published URL wins over local exports ---
    let sheets: Arc<dyn SheetSource> = match &cfg.sheet_url {
        Some(url) => {
            info!(url = %url, "reading sheets over HTTP");
            Arc::new(HttpCsvSource::new(url)?)
        }
        None => {
            let dir = cfg.sheet_dir_or_default();
            info!(dir = %dir, "reading sheets from directory");
            Arc::new(CsvDirSource::new(dir))
        }
    };

    let loader = CatalogLoader::new(sheets)
        .with_tables(cfg.messages_table_or_default(), cfg.series_table_or_default());
    let (catalog, stats) = loader.load().await?;
    if command == Command::Check {
        info!(?stats, "check finished");
        return Ok(());
    }

    // --- Rendering ---
    let template = match (&cfg.template_path, &cfg.template_url) {
        (Some(path), _) => PageTemplate::from_file(path).await?,
        (None, Some(url)) => PageTemplate::from_url(url).await?,
        (None, None) => PageTemplate::default(),
    };
    let renderer: Arc<dyn PageRenderer> = Arc::new(HtmlRenderer::new(template, cfg.skin.clone())?);

    let sets = cfg.page_sets().map_err(|e| anyhow::anyhow!("CATALOG_VISIBILITIES: {}", e))?;
    let output_dir = PathBuf::from(cfg.output_dir_or_default());
    let publisher = PublishService::new(renderer, &output_dir, cfg.recent_days_or_default());
    let manifest = publisher.publish(&catalog, &sets).await?;
    info!(pages = manifest.pages.len(), output = %output_dir.display(), "site rendered");

    if command != Command::Upload {
        return Ok(());
    }

    // --- Upload ---
    let store = object_store(&cfg).await?;
    let uploader = Uploader::new(store, cfg.upload_workers_or_default());
    let report = uploader.upload_dir(&output_dir).await?;
    if !report.is_complete() {
        for (key, error) in &report.failed {
            warn!(key = %key, error = %error, "not uploaded");
        }
        anyhow::bail!("{} of {} files failed to upload", report.failed.len(), report.failed.len() + report.uploaded.len());
    }
    Ok(())
}

#[cfg(feature = "s3")]
async fn object_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    use sermon_catalog::adapters::storage::S3Store;
    if let Some(bucket) = &cfg.s3_bucket {
        return Ok(Arc::new(S3Store::from_env(bucket.clone(), cfg.s3_prefix.clone()).await));
    }
    dir_store(cfg)
}

#[cfg(not(feature = "s3"))]
async fn object_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    if cfg.s3_bucket.is_some() {
        anyhow::bail!("CATALOG_S3_BUCKET is set but this build has no `s3` feature");
    }
    dir_store(cfg)
}

fn dir_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match &cfg.upload_dir {
        Some(dir) => Ok(Arc::new(DirStore::new(dir))),
        None => anyhow::bail!("Set CATALOG_UPLOAD_DIR or CATALOG_S3_BUCKET to upload"),
    }
}
