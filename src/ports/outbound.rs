//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::page::Page;
use crate::domain::{DomainError, Table};

/// Tabular row source. One named table per call.
#[async_trait::async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch a whole table with its header. An unreachable source or a
    /// missing table is fatal for the load.
    async fn fetch_table(&self, name: &str) -> Result<Table, DomainError>;
}

/// Turns a page model into a complete HTML document.
pub trait PageRenderer: Send + Sync {
    fn render(&self, page: &Page) -> Result<String, DomainError>;
}

/// Object storage for published files.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any previous object.
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), DomainError>;
}
