// ============================================================
// Layer 2 - Compare Use Case
// ============================================================
// Loads a real and a synthetic CSV and summarises how far
// apart they are. Needs no trained run.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::data::compare::{compare_tables, ComparisonReport};
use crate::data::loader::CsvLoader;
use crate::domain::traits::TableSource;

pub struct CompareUseCase {
    real:     PathBuf,
    fake:     PathBuf,
    group_by: Vec<String>,
}

impl CompareUseCase {
    pub fn new(real: impl Into<PathBuf>, fake: impl Into<PathBuf>, group_by: Vec<String>) -> Self {
        Self { real: real.into(), fake: fake.into(), group_by }
    }

    pub fn execute(&self) -> Result<ComparisonReport> {
        let real = CsvLoader::new(&self.real)
            .load()
            .with_context(|| format!("Cannot load real data '{}'", self.real.display()))?;
        let fake = CsvLoader::new(&self.fake)
            .load()
            .with_context(|| format!("Cannot load synthetic data '{}'", self.fake.display()))?;

        let report = compare_tables(&real, &fake, &self.group_by).context("Cannot compare tables")?;
        tracing::info!(
            "Compared {} columns over {} groups",
            report.columns.len(),
            report.groups.len() / 2
        );
        Ok(report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::compare::Source;

    #[test]
    fn test_compare_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.csv");
        let fake = dir.path().join("fake.csv");
        std::fs::write(&real, "y,t\n1,0\n3,0\n10,1\n").unwrap();
        std::fs::write(&fake, "y,t\n2,0\n2,0\n8,1\n12,1\n").unwrap();

        let report = CompareUseCase::new(&real, &fake, vec!["t".into()]).execute().unwrap();
        let real_0 = report.summary(&["0".to_string()], Source::Real).unwrap();
        assert_eq!(real_0.rows, 2);
        assert_eq!(real_0.means[report.columns.iter().position(|c| c == "y").unwrap()], Some(2.0));
        let fake_1 = report.summary(&["1".to_string()], Source::Fake).unwrap();
        assert_eq!(fake_1.rows, 2);
    }

    #[test]
    fn test_unknown_group_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "y\n1\n2\n").unwrap();
        let err = CompareUseCase::new(&path, &path, vec!["t".into()]).execute().unwrap_err();
        assert!(format!("{err:#}").contains("t"));
    }
}
