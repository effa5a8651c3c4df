// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Records one row per training epoch to a CSV file.
//
// Metrics recorded per epoch:
//   - epoch:    the epoch number (0-based, as in the log lines)
//   - step:     the global step counter after the epoch
//   - wd_test:  mean Wasserstein estimate on the held-out rows
//   - wd_train: mean Wasserstein estimate over the critic steps
//   - seconds:  wall time since the previous progress report
//
// An undefined estimate (no critic update, empty test split)
// is written as an empty cell.
//
// Example CSV output:
//   epoch,step,wd_test,wd_train,seconds
//   0,10,0.153200,0.201100,0.41
//   1,19,0.088400,0.120300,0.39
//
// The file is appended to, so a resumed run continues the log
// of the interrupted one.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::error::Result;

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub step: usize,
    pub wd_test: Option<f64>,
    pub wd_train: Option<f64>,
    pub seconds: f64,
}

/// Logs epoch metrics to a CSV file for later analysis.
#[derive(Debug, Clone)]
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a logger for `csv_path`.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(csv_path: impl Into<PathBuf>) -> Result<Self> {
        let csv_path = csv_path.into();
        if let Some(dir) = csv_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,step,wd_test,wd_train,seconds")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let cell = |v: Option<f64>| v.map(|x| format!("{x:.6}")).unwrap_or_default();

        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{},{},{},{:.2}",
            m.epoch,
            m.step,
            cell(m.wd_test),
            cell(m.wd_train),
            m.seconds,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_once_and_rows_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");

        let logger = MetricsLogger::new(&path).unwrap();
        logger
            .log(&EpochMetrics { epoch: 0, step: 10, wd_test: Some(0.5), wd_train: None, seconds: 1.0 })
            .unwrap();
        // A second logger on the same file must not repeat the header
        let logger = MetricsLogger::new(&path).unwrap();
        logger
            .log(&EpochMetrics { epoch: 1, step: 19, wd_test: Some(-0.25), wd_train: Some(0.125), seconds: 0.5 })
            .unwrap();

        let content = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "epoch,step,wd_test,wd_train,seconds",
                "0,10,0.500000,,1.00",
                "1,19,-0.250000,0.125000,0.50",
            ]
        );
    }
}
