//! Tabular row sources. Implement SheetSource.
//!
//! Every source hands back CSV text; [`parse_csv`] turns it into a [`Table`].

pub mod csv_dir;
pub mod http_csv;
pub mod memory;

pub use csv_dir::CsvDirSource;
pub use http_csv::HttpCsvSource;
pub use memory::MemorySource;

use crate::domain::{DomainError, Row, Table};

/// Parse CSV with a header row. Header cells become normalized column keys.
pub fn parse_csv(name: &str, data: impl std::io::Read) -> Result<Table, DomainError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| DomainError::Sheet(format!("{}: {}", name, e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| DomainError::Sheet(format!("{}: {}", name, e)))?;
        let mut row = Row::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            row.set(header, value);
        }
        rows.push(row);
    }

    let columns: Vec<&str> = headers.iter().map(String::as_str).collect();
    Ok(Table::new(name, &columns, rows))
}
