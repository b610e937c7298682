//! ExportTable: an ordered table of string cells with a fixed column set

use super::ExportError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row; short rows are padded with empty cells.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        debug_assert!(row.len() <= self.columns.len(), "row wider than table");
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Row `index` as a column → value mapping.
    pub fn row(&self, index: usize) -> Option<BTreeMap<&str, &str>> {
        self.rows.get(index).map(|row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect()
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Serialize with a header row; values are quoted per RFC 4180 as needed.
    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
    }

    /// Parse CSV with a header row. Every record must match the header width.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, ExportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = Self::new(columns);
        for record in reader.records() {
            let record = record?;
            table.rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(table)
    }
}
