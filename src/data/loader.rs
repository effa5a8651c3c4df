// ============================================================
// Layer 4 - CSV Loader and Writer
// ============================================================
// Reads a CSV file with a header row into a Table, and writes
// a Table back out.
//
// Column typing:
//   A column becomes Numeric when every cell parses as f64
//   (surrounding whitespace ignored), otherwise Text. So a 0/1
//   indicator column is numeric and a "yes"/"no" column is text;
//   both can serve as categorical variables.

use std::path::PathBuf;

use crate::domain::error::Result;
use crate::domain::table::{Column, Table};
use crate::domain::traits::{TableSink, TableSource};

/// Loads a table from a CSV file.
/// Implements the TableSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for CsvLoader {
    fn load(&self) -> Result<Table> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

        // Collect raw cells column by column
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (i, value) in record.iter().enumerate().take(headers.len()) {
                cells[i].push(value.to_string());
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| (name, infer_column(values)))
            .collect();
        let table = Table::from_columns(columns)?;

        tracing::info!(
            "Loaded {} rows x {} columns from '{}'",
            table.num_rows(),
            table.num_columns(),
            self.path.display()
        );
        Ok(table)
    }
}

/// Writes a table to a CSV file.
/// Implements the TableSink trait from Layer 3.
pub struct CsvWriter {
    path: PathBuf,
}

impl CsvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSink for CsvWriter {
    fn write(&self, table: &Table) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(table.column_names())?;
        for row in 0..table.num_rows() {
            writer.write_record(table.iter().map(|(_, c)| c.display_value(row)))?;
        }
        writer.flush()?;
        tracing::debug!("Wrote {} rows to '{}'", table.num_rows(), self.path.display());
        Ok(())
    }
}

/// Numeric when every cell parses, otherwise text
fn infer_column(values: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = values.iter().map(|v| v.trim().parse::<f64>().ok()).collect();
    match parsed {
        Some(numbers) if !values.is_empty() => Column::Numeric(numbers),
        _ => Column::Text(values),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_typing() {
        assert_eq!(
            infer_column(vec!["1".into(), " 2.5 ".into()]),
            Column::Numeric(vec![1.0, 2.5])
        );
        assert!(matches!(infer_column(vec!["1".into(), "x".into()]), Column::Text(_)));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let table = Table::from_columns(vec![
            ("t".into(), Column::Numeric(vec![0.0, 1.0])),
            ("married".into(), Column::Text(vec!["yes".into(), "no".into()])),
        ])
        .unwrap();

        CsvWriter::new(&path).write(&table).unwrap();
        let loaded = CsvLoader::new(&path).load().unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(CsvLoader::new("/definitely/not/here.csv").load().is_err());
    }
}
