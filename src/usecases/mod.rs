//! Application use cases. Orchestrate domain logic via ports.

pub mod load_service;
pub mod publish_service;
pub mod upload_worker;

pub use load_service::{CatalogLoader, LoadStats};
pub use publish_service::{Manifest, PageSet, PublishService};
pub use upload_worker::{UploadReport, Uploader};
