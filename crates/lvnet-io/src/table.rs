//! Numeric tables read from CSV.
//!
//! Only numeric columns are kept: a column is numeric when every non-empty
//! cell parses as a float. Text columns (names, comments, dates) are dropped
//! before column positions are resolved, so a layout always counts numeric
//! columns only. Empty cells become `NaN`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericTable {
    headers: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl NumericTable {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .with_context(|| format!("opening table '{}'", path.display()))?;
        Self::from_csv(reader).with_context(|| format!("reading table '{}'", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers: Vec<String> = reader
            .headers()
            .context("reading CSV header")?
            .iter()
            .map(str::to_string)
            .collect();
        let records: Vec<StringRecord> = reader
            .records()
            .collect::<std::result::Result<_, _>>()
            .context("parsing CSV record")?;

        let width = records
            .iter()
            .map(StringRecord::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);
        let numeric: Vec<usize> = (0..width)
            .filter(|&col| {
                records
                    .iter()
                    .all(|record| parse_cell(record.get(col).unwrap_or("")).is_some())
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                numeric
                    .iter()
                    .map(|&col| parse_cell(record.get(col).unwrap_or("")).unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();
        let headers = numeric
            .iter()
            .map(|&col| headers.get(col).cloned().unwrap_or_default())
            .collect();
        Ok(Self { headers, rows })
    }

    /// Names of the numeric columns, in position order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width() == 0
    }

    /// All values, row by row.
    pub fn flattened(&self) -> Vec<f64> {
        self.rows.iter().flatten().copied().collect()
    }
}

/// `Some(NaN)` for empty cells, `None` for text.
fn parse_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    cell.parse::<f64>().ok()
}
