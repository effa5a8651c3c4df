// ============================================================
// Layer 6 - Artifact Store
// ============================================================
// Everything a training run leaves behind, in one directory:
//
//   <output-dir>/
//     train_config.json   ← hyperparameters, rebuilds the networks
//     feature_spec.json   ← normalisation stats and levels
//     checkpoint.bin      ← weights + optimizer state
//     metrics.csv         ← one row per epoch
//
// `generate` and `score` read the first three back, so they
// encode, build and decode exactly as the training run did.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use crate::data::codec::FeatureSpec;
use crate::ml::config::TrainConfig;

const CONFIG_FILE: &str = "train_config.json";
const FEATURE_SPEC_FILE: &str = "feature_spec.json";
const CHECKPOINT_FILE: &str = "checkpoint.bin";
const METRICS_FILE: &str = "metrics.csv";

/// Reads and writes the files of one training run
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create the store, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.dir.join(CHECKPOINT_FILE)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.dir.join(METRICS_FILE)
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(CONFIG_FILE)
    }

    pub fn save_feature_spec(&self, spec: &FeatureSpec) -> Result<()> {
        self.write_json(FEATURE_SPEC_FILE, spec)
    }

    pub fn load_feature_spec(&self) -> Result<FeatureSpec> {
        self.read_json(FEATURE_SPEC_FILE)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' with this output directory first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json).with_context(|| format!("Cannot parse '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::codec::FeatureVariables;
    use crate::domain::table::{Column, Table};

    #[test]
    fn test_config_and_spec_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("run")).unwrap();

        let cfg = TrainConfig { max_epochs: 7, ..TrainConfig::default() };
        store.save_config(&cfg).unwrap();
        assert_eq!(store.load_config().unwrap(), cfg);

        let table = Table::from_columns(vec![
            ("x".into(), Column::Numeric(vec![1.0, 2.0, 4.0])),
            ("t".into(), Column::Numeric(vec![0.0, 1.0, 0.0])),
        ])
        .unwrap();
        let spec = FeatureSpec::build(&table, &FeatureVariables::new(["x"], Vec::<String>::new(), ["t"])).unwrap();
        store.save_feature_spec(&spec).unwrap();
        assert_eq!(store.load_feature_spec().unwrap(), spec);

        assert_eq!(store.checkpoint_path(), dir.path().join("run").join("checkpoint.bin"));
    }

    #[test]
    fn test_missing_artifact_mentions_train() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        let err = store.load_config().unwrap_err();
        assert!(format!("{err:#}").contains("train"));
    }
}
