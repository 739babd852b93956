//! Port traits. API boundaries for the hexagon.
//!
//! Outbound only: the application calls into row sources, renderers and
//! object stores. The CLI drives the use cases directly.

pub mod outbound;

pub use outbound::{ObjectStore, PageRenderer, SheetSource};
