//! Infrastructure adapters. Implement outbound ports.
//!
//! Sheets, HTML rendering, object storage. Map errors to DomainError.

pub mod render;
pub mod sheets;
pub mod storage;
