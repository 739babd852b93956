//! Cross-cutting concerns shared by the binary and use cases.

pub mod config;
