//! Implements SheetSource over a directory of CSV exports: `<dir>/<name>.csv`.

use super::parse_csv;
use crate::domain::{DomainError, Table};
use crate::ports::SheetSource;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub struct CsvDirSource {
    base_dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.csv", name))
    }
}

#[async_trait::async_trait]
impl SheetSource for CsvDirSource {
    async fn fetch_table(&self, name: &str) -> Result<Table, DomainError> {
        let path = self.table_path(name);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DomainError::MissingTable(name.to_string()));
            }
            Err(e) => return Err(DomainError::Sheet(format!("{}: {}", path.display(), e))),
        };
        let table = parse_csv(name, bytes.as_slice())?;
        info!(path = %path.display(), rows = table.rows.len(), "read table");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_named_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Series.csv"), "webid,name\nS1,Acts\n").unwrap();

        let source = CsvDirSource::new(dir.path());
        let table = source.fetch_table("Series").await.unwrap();
        assert_eq!(table.name, "Series");
        assert_eq!(table.rows[0].value("webid"), Some("S1"));
    }

    #[tokio::test]
    async fn test_missing_file_is_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvDirSource::new(dir.path());
        let err = source.fetch_table("Messages").await.unwrap_err();
        assert!(matches!(err, DomainError::MissingTable(name) if name == "Messages"));
    }
}
