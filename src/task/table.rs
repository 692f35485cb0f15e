//! Tabular data shown next to every task.
//!
//! Files are plain comma-separated rows without a header line. Double quotes
//! are stripped from every field and blank lines are skipped. A row whose
//! column count differs from the first row fails the load.

use std::fs;
use std::path::Path;

use crate::{sxlog_debug, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn parse(name: &str, header: &[&str], text: &str) -> Result<Self> {
        let rows = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.replace('"', "").split(',').map(str::to_string).collect())
            .collect();
        Self::new(name, header.iter().map(|h| h.to_string()).collect(), rows)
    }

    pub fn load(path: &Path, header: &[&str]) -> Result<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        sxlog_debug!("Table::load path={}", path.display());
        Self::parse(&name, header, &fs::read_to_string(path)?)
    }

    /// Build a table from rows, rejecting ragged data. Rows are numbered
    /// from 1 in errors; row 0 refers to the header.
    pub fn new(name: &str, header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let expected = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::EmptyTable(name.to_string()))?;

        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(Error::Table {
                table: name.to_string(),
                row: index + 1,
                expected,
                found: row.len(),
            });
        }
        if !header.is_empty() && header.len() != expected {
            return Err(Error::Table {
                table: name.to_string(),
                row: 0,
                expected,
                found: header.len(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            header,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn value(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_quotes_and_blank_lines() {
        let table = Table::parse("t", &[], "\"Fiat 128\",32.4,4\n\"Honda Civic\",30.4,4\n\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.col_count(), 3);
        assert_eq!(table.value(1, 0), Some("Honda Civic"));
        assert_eq!(table.value(2, 0), None);
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = Table::parse("ragged", &[], "1,2,3\n4,5,6\n7,8\n").unwrap_err();
        match err {
            Error::Table { row, expected, found, .. } => {
                assert_eq!((row, expected, found), (3, 3, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(Table::parse("e", &[], "\n\n"), Err(Error::EmptyTable(_))));
    }

    #[test]
    fn test_header_must_match_width() {
        assert!(Table::parse("h", &["a", "b"], "1,2\n").is_ok());
        assert!(matches!(
            Table::parse("h", &["a"], "1,2\n"),
            Err(Error::Table { row: 0, .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syntax-data9.csv");
        std::fs::write(&path, "1,2\n3,4\n").unwrap();

        let table = Table::load(&path, &[]).unwrap();
        assert_eq!(table.name(), "syntax-data9");
        assert_eq!(table.value(1, 1), Some("4"));
    }
}
