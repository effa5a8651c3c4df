// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores the full training state in one file.
//
// What gets saved per checkpoint:
//   1. epoch        - the next epoch to run after resuming
//   2. global_step  - the step counter, never reset
//   3. generator and critic weights
//   4. generator and critic optimizer state
//   5. which optimizer produced that state
//
// Weights and optimizer state are burn records serialised with
// NamedMpkBytesRecorder at full precision, so a resumed run sees
// exactly the numbers the interrupted run had. The records and
// counters are wrapped in one bincode envelope.
//
// Writes are atomic: the envelope goes to `<path>.tmp`, is
// synced to disk, then renamed over `<path>`. A crash mid-write
// leaves the previous checkpoint intact.

use std::{
    fs,
    io::Write,
    path::PathBuf,
};

use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Record, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::domain::error::{Result, WganError};
use crate::ml::config::OptimizerKind;

/// Serialise a burn record to bytes at full precision
pub fn encode_record<B: Backend, R: Record<B>>(record: R) -> Result<Vec<u8>> {
    let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
    Recorder::<B>::record(&recorder, record, ()).map_err(|e| WganError::Record(format!("{e:?}")))
}

/// Inverse of `encode_record`
pub fn decode_record<B: Backend, R: Record<B>>(bytes: Vec<u8>, device: &B::Device) -> Result<R> {
    let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
    Recorder::<B>::load(&recorder, bytes, device).map_err(|e| WganError::Record(format!("{e:?}")))
}

// ─── TrainingCheckpoint ───────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingCheckpoint {
    /// First epoch to run after resuming
    pub epoch:               usize,
    pub global_step:         usize,
    pub optimizer:           OptimizerKind,
    pub generator:           Vec<u8>,
    pub critic:              Vec<u8>,
    pub generator_optimizer: Vec<u8>,
    pub critic_optimizer:    Vec<u8>,
}

// ─── CheckpointManager ────────────────────────────────────────────────────────
/// Reads and writes one checkpoint file
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    path: PathBuf,
}

impl CheckpointManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Atomically replace the checkpoint file
    pub fn save(&self, checkpoint: &TrainingCheckpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = bincode::serialize(checkpoint)?;
        let tmp = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            "Saved checkpoint (epoch {}, step {}) to '{}'",
            checkpoint.epoch,
            checkpoint.global_step,
            self.path.display()
        );
        Ok(())
    }

    pub fn load(&self) -> Result<TrainingCheckpoint> {
        let bytes = fs::read(&self.path).map_err(|e| {
            WganError::Checkpoint(format!("cannot read '{}': {e}", self.path.display()))
        })?;
        let checkpoint: TrainingCheckpoint = bincode::deserialize(&bytes)?;
        tracing::info!(
            "Loaded checkpoint '{}' (resuming at epoch {}, step {})",
            self.path.display(),
            checkpoint.epoch,
            checkpoint.global_step
        );
        Ok(checkpoint)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint(epoch: usize) -> TrainingCheckpoint {
        TrainingCheckpoint {
            epoch,
            global_step: 40,
            optimizer: OptimizerKind::AdamHd,
            generator: vec![1, 2, 3],
            critic: vec![4, 5],
            generator_optimizer: vec![6],
            critic_optimizer: vec![],
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().join("nested").join("model.ckpt"));
        assert!(!manager.exists());

        manager.save(&checkpoint(3)).unwrap();
        assert!(manager.exists());
        assert_eq!(manager.load().unwrap(), checkpoint(3));
    }

    #[test]
    fn test_save_replaces_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.ckpt");
        let manager = CheckpointManager::new(&path);

        manager.save(&checkpoint(1)).unwrap();
        manager.save(&checkpoint(2)).unwrap();

        assert_eq!(manager.load().unwrap().epoch, 2);
        assert!(!dir.path().join("model.ckpt.tmp").exists());
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_missing_file_is_checkpoint_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().join("absent.ckpt"));
        assert!(matches!(manager.load(), Err(WganError::Checkpoint(_))));
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.ckpt");
        fs::write(&path, b"not a checkpoint").unwrap();
        assert!(CheckpointManager::new(&path).load().is_err());
    }
}
