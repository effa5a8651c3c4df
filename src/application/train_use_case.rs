// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the CSV table           (Layer 4 - data)
//   Step 2: Build or reload FeatureSpec  (Layer 4 - data)
//   Step 3: Encode the table             (Layer 4 - data)
//   Step 4: Save config and spec         (Layer 6 - infra)
//   Step 5: Build or resume the trainer  (Layer 5 - ml)
//   Step 6: Run the training loop        (Layer 5 - ml)
//   Step 7: Save the final checkpoint    (Layer 6 - infra)
//
// On --resume the stored FeatureSpec is reused, so the data is
// normalised with the statistics the checkpoint was trained on.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use burn::tensor::backend::AutodiffBackend;

use crate::application::AppBackend;
use crate::data::codec::{FeatureSpec, FeatureVariables};
use crate::data::loader::CsvLoader;
use crate::domain::traits::TableSource;
use crate::infra::{
    artifacts::ArtifactStore,
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
};
use crate::ml::config::TrainConfig;
use crate::ml::trainer::{EpochReport, WganTrainer};

/// Everything a training run needs
#[derive(Debug, Clone)]
pub struct TrainRequest {
    pub data:       PathBuf,
    pub variables:  FeatureVariables,
    pub output_dir: PathBuf,
    /// Continue from the checkpoint in `output_dir`
    pub resume:     bool,
    pub config:     TrainConfig,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    request: TrainRequest,
}

impl TrainUseCase {
    pub fn new(request: TrainRequest) -> Self {
        Self { request }
    }

    /// Train on the default backend
    pub fn execute(&self) -> Result<Vec<EpochReport>> {
        self.execute_on::<AppBackend>(Default::default())
    }

    /// Execute the full training pipeline end to end on backend B
    pub fn execute_on<B: AutodiffBackend>(&self, device: B::Device) -> Result<Vec<EpochReport>> {
        let req = &self.request;

        // ── Step 1: Load the table ───────────────────────────────────────────
        let table = CsvLoader::new(&req.data)
            .load()
            .with_context(|| format!("Cannot load training data '{}'", req.data.display()))?;

        // ── Step 2: Feature specification ────────────────────────────────────
        let store = ArtifactStore::new(&req.output_dir)?;
        let spec = if req.resume {
            store.load_feature_spec()?
        } else {
            FeatureSpec::build(&table, &req.variables).context("Cannot build feature specification")?
        };

        // ── Step 3: Encode ───────────────────────────────────────────────────
        let encoded = spec.encode(&table).context("Cannot encode training data")?;

        // ── Step 4: Persist config and spec ──────────────────────────────────
        let mut config = req.config.clone();
        config.save_checkpoint = Some(store.checkpoint_path());
        if req.resume {
            let path = store.checkpoint_path();
            if !path.is_file() {
                bail!("--resume given but no checkpoint at '{}'", path.display());
            }
            config.load_checkpoint = Some(path);
        }
        store.save_config(&config)?;
        store.save_feature_spec(&spec)?;

        // ── Step 5: Trainer ──────────────────────────────────────────────────
        let metrics = MetricsLogger::new(store.metrics_path())?;
        let mut trainer = WganTrainer::<B>::new(config, &spec, device)
            .context("Cannot set up training")?
            .with_metrics(metrics);

        // ── Step 6: Train ────────────────────────────────────────────────────
        let reports = trainer.fit(&encoded).context("Training failed")?;

        // ── Step 7: Final checkpoint ─────────────────────────────────────────
        // The periodic save may have skipped the last epoch
        CheckpointManager::new(store.checkpoint_path()).save(&trainer.snapshot()?)?;
        tracing::info!("Artifacts written to '{}'", store.dir().display());

        Ok(reports)
    }
}
