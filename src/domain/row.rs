//! Tabular rows as delivered by a sheet source.
//!
//! Column names are normalized (lowercase, no whitespace) the same way the
//! spreadsheet list feed names them, so `Date Started` becomes `datestarted`.

use crate::domain::DomainError;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Normalize a header cell into a column key.
pub fn column_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One spreadsheet row. Empty cells are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by sources and tests. Blank values are dropped.
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.values.insert(column_key(column), value.to_string());
    }

    /// Raw trimmed cell value.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.values.get(&column_key(column)).map(String::as_str)
    }

    pub fn string(&self, column: &str) -> Option<String> {
        self.value(column).map(str::to_string)
    }

    /// Semicolon-separated cell as trimmed, non-empty parts.
    pub fn list(&self, column: &str) -> Vec<String> {
        self.value(column)
            .map(|v| {
                v.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `yyyy-MM-dd`, or `MM/dd/yyyy` as typed into the sheet. `Ok(None)` for
    /// an empty cell; anything unparseable is an error naming the raw text.
    pub fn date(&self, column: &str) -> Result<Option<NaiveDate>, String> {
        let Some(value) = self.value(column) else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
            .map(Some)
            .map_err(|_| format!("unable to parse {} date '{}'", column_key(column), value))
    }

    /// Integer cell. Floats are truncated.
    pub fn long(&self, column: &str) -> Result<Option<i64>, String> {
        let Some(value) = self.value(column) else {
            return Ok(None);
        };
        value
            .parse::<i64>()
            .ok()
            .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| format!("unable to parse {} '{}'", column_key(column), value))
    }
}

/// A named table of rows with its header.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: &[&str], rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| column_key(c)).collect(),
            rows,
        }
    }

    /// Fails on the first missing column. A missing column aborts the load.
    pub fn require_columns(&self, required: &[&str]) -> Result<(), DomainError> {
        for column in required {
            let key = column_key(column);
            if !self.columns.contains(&key) {
                return Err(DomainError::MissingColumn {
                    table: self.name.clone(),
                    column: key,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_key_normalizes_headers() {
        assert_eq!(column_key("Date Started"), "datestarted");
        assert_eq!(column_key(" webid "), "webid");
    }

    #[test]
    fn test_row_values() {
        let row = Row::new()
            .with("Speaker", " Vern Peltz ; ; Guest ")
            .with("date", "2015-03-01")
            .with("dateended", "03/08/2015")
            .with("messages", "4.0")
            .with("description", "   ");

        assert_eq!(row.list("speaker"), vec!["Vern Peltz", "Guest"]);
        assert_eq!(row.date("date"), Ok(NaiveDate::from_ymd_opt(2015, 3, 1)));
        assert_eq!(row.date("dateended"), Ok(NaiveDate::from_ymd_opt(2015, 3, 8)));
        assert_eq!(row.date("datestarted"), Ok(None));
        assert_eq!(row.long("messages"), Ok(Some(4)));
        assert_eq!(row.value("description"), None);
        assert!(row.list("track").is_empty());
    }

    #[test]
    fn test_unparsable_cells_are_errors() {
        let row = Row::new()
            .with("date", "sometime in May")
            .with("Date Ended", "2015-13-45")
            .with("messages", "four");
        assert_eq!(
            row.date("date"),
            Err("unable to parse date date 'sometime in May'".to_string())
        );
        assert_eq!(
            row.date("dateended"),
            Err("unable to parse dateended date '2015-13-45'".to_string())
        );
        assert_eq!(row.long("messages"), Err("unable to parse messages 'four'".to_string()));
    }

    #[test]
    fn test_require_columns() {
        let table = Table::new("Messages", &["date", "Name"], vec![]);
        assert!(table.require_columns(&["date", "name"]).is_ok());
        let err = table.require_columns(&["date", "speaker"]).unwrap_err();
        assert!(err.to_string().contains("'speaker'"));
        assert!(err.to_string().contains("'Messages'"));
    }
}
