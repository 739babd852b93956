//! Core domain layer. No external I/O dependencies.
//!
//! Catalog entities, visibility rules and filters live here. Dependencies
//! flow inward.

pub mod access_level;
pub mod catalog;
pub mod errors;
pub mod filters;
pub mod message;
pub mod page;
pub mod resource;
pub mod row;
pub mod series;
pub mod validation;

pub use access_level::AccessLevel;
pub use catalog::Catalog;
pub use errors::DomainError;
pub use filters::{CatalogFilter, FilterChain, TagSet, YearMode};
pub use message::Message;
pub use page::{Page, PageBody, SeriesEntry};
pub use resource::{MessageRef, Provenance, Resource, SeriesRef};
pub use row::{Row, Table};
pub use series::Series;
pub use validation::ValidationReport;
