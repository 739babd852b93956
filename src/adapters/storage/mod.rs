//! Object stores for published pages. Implement ObjectStore.

pub mod dir_store;
pub mod memory_store;
#[cfg(feature = "s3")]
pub mod s3_store;

pub use dir_store::DirStore;
pub use memory_store::MemoryStore;
#[cfg(feature = "s3")]
pub use s3_store::S3Store;

/// Content type from a key's extension.
pub fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
