//! In-memory SheetSource. Used by tests and dry runs.

use crate::domain::{DomainError, Table};
use crate::ports::SheetSource;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemorySource {
    tables: HashMap<String, Table>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }
}

#[async_trait::async_trait]
impl SheetSource for MemorySource {
    async fn fetch_table(&self, name: &str) -> Result<Table, DomainError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::MissingTable(name.to_string()))
    }
}
