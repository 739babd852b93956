//! Implements SheetSource over published CSV exports: GET `<base>/<name>.csv`.

use super::parse_csv;
use crate::domain::{DomainError, Table};
use crate::ports::SheetSource;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

pub struct HttpCsvSource {
    client: Client,
    base: Url,
}

impl HttpCsvSource {
    /// `base` must be an absolute URL; a trailing slash is added if missing.
    pub fn new(base: &str) -> Result<Self, DomainError> {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| DomainError::Sheet(format!("invalid sheet URL '{}': {}", base, e)))?;
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    pub fn table_url(&self, name: &str) -> Result<Url, DomainError> {
        self.base
            .join(&format!("{}.csv", name))
            .map_err(|e| DomainError::Sheet(format!("invalid table name '{}': {}", name, e)))
    }
}

#[async_trait::async_trait]
impl SheetSource for HttpCsvSource {
    async fn fetch_table(&self, name: &str) -> Result<Table, DomainError> {
        let url = self.table_url(name)?;
        debug!(url = %url, "fetching table");

        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DomainError::Sheet(format!("Request failed: {}", e)))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(DomainError::MissingTable(name.to_string()));
        }
        if !res.status().is_success() {
            let status = res.status();
            return Err(DomainError::Sheet(format!("GET {} returned {}", url, status)));
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| DomainError::Sheet(format!("Reading {} failed: {}", url, e)))?;
        let table = parse_csv(name, body.as_ref())?;
        info!(url = %url, rows = table.rows.len(), "fetched table");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let source = HttpCsvSource::new("https://sheets.example.com/export").unwrap();
        assert_eq!(
            source.table_url("Messages").unwrap().as_str(),
            "https://sheets.example.com/export/Messages.csv"
        );
    }

    #[test]
    fn test_rejects_relative_base() {
        assert!(matches!(HttpCsvSource::new("exports"), Err(DomainError::Sheet(_))));
    }
}
