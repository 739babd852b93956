//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Per-entity validation
//! problems are not errors; see [`crate::domain::ValidationReport`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Sheet source error: {0}")]
    Sheet(String),

    #[error("Cannot find table '{0}'")]
    MissingTable(String),

    #[error("Cannot find column '{column}' in the table '{table}'")]
    MissingColumn { table: String, column: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
