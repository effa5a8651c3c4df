// ============================================================
// Layer 2 - Generate / Score Use Case
// ============================================================
// Loads a finished training run from its output directory:
//
//   1. TrainConfig  → rebuilds generator and critic shapes
//   2. FeatureSpec  → encodes inputs and decodes outputs
//   3. Checkpoint   → restores the trained weights
//
// The networks are used through `valid()`, so dropout is off
// and no autodiff graph is recorded.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burn::module::AutodiffModule;
use burn::tensor::backend::AutodiffBackend;

use crate::application::AppBackend;
use crate::data::codec::FeatureSpec;
use crate::data::loader::{CsvLoader, CsvWriter};
use crate::domain::table::Table;
use crate::domain::traits::{TableSink, TableSource};
use crate::infra::artifacts::ArtifactStore;
use crate::ml::critic::Critic;
use crate::ml::generator::Generator;
use crate::ml::layers::{stream_rng, Stream};
use crate::ml::trainer::WganTrainer;

// ─── GenerateUseCase ──────────────────────────────────────────────────────────
pub struct GenerateUseCase {
    store: ArtifactStore,
}

/// Trained networks on the non-autodiff backend, with their codec
struct TrainedModels<B: AutodiffBackend> {
    spec:      FeatureSpec,
    generator: Generator<B::InnerBackend>,
    critic:    Critic<B::InnerBackend>,
}

impl GenerateUseCase {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self { store: ArtifactStore::new(output_dir)? })
    }

    /// Synthesize a table on the default backend
    pub fn generate(&self, data: &Path, out: &Path, rows: Option<usize>, seed: u64) -> Result<Table> {
        self.generate_on::<AppBackend>(data, out, rows, seed, Default::default())
    }

    /// Score a table on the default backend
    pub fn score(&self, data: &Path, out: &Path, column: &str, seed: u64) -> Result<Table> {
        self.score_on::<AppBackend>(data, out, column, seed, Default::default())
    }

    /// Draw `rows` rows of `data` with replacement (all rows, in
    /// order, when None), replace their generated columns with
    /// generator output and write the result to `out`.
    pub fn generate_on<B: AutodiffBackend>(
        &self,
        data: &Path,
        out: &Path,
        rows: Option<usize>,
        seed: u64,
        device: B::Device,
    ) -> Result<Table> {
        let models = self.load_models::<B>(&device)?;
        let table = load_table(data)?;
        let mut rng = stream_rng(seed, Stream::Generation, 0);

        let conditioning = match rows {
            Some(n) => table.sample_rows(n, true, &mut rng),
            None => table,
        };
        let synthetic = models
            .spec
            .apply_generator(&models.generator, &conditioning, &device, &mut rng)
            .context("Cannot apply the generator")?;

        CsvWriter::new(out).write(&synthetic)?;
        tracing::info!("Wrote {} synthetic rows to '{}'", synthetic.num_rows(), out.display());
        Ok(synthetic)
    }

    /// Add the critic score of every row of `data` as the first
    /// column `column` and write the result to `out`.
    pub fn score_on<B: AutodiffBackend>(
        &self,
        data: &Path,
        out: &Path,
        column: &str,
        seed: u64,
        device: B::Device,
    ) -> Result<Table> {
        let models = self.load_models::<B>(&device)?;
        let table = load_table(data)?;
        let mut rng = stream_rng(seed, Stream::Generation, 1);

        let scored = models
            .spec
            .apply_critic(&models.critic, &table, column, &device, &mut rng)
            .context("Cannot apply the critic")?;

        CsvWriter::new(out).write(&scored)?;
        tracing::info!("Wrote {} scored rows to '{}'", scored.num_rows(), out.display());
        Ok(scored)
    }

    fn load_models<B: AutodiffBackend>(&self, device: &B::Device) -> Result<TrainedModels<B>> {
        let spec = self.store.load_feature_spec()?;
        let mut config = self.store.load_config()?;

        let checkpoint = self.store.checkpoint_path();
        config.load_checkpoint = Some(checkpoint.clone());
        config.save_checkpoint = None;

        let trainer = WganTrainer::<B>::new(config, &spec, device.clone())
            .with_context(|| format!("Cannot restore networks from '{}'", checkpoint.display()))?;
        tracing::info!("Restored networks trained for {} epochs", trainer.epoch());

        let (generator, critic) = trainer.into_models();
        Ok(TrainedModels { spec, generator: generator.valid(), critic: critic.valid() })
    }
}

fn load_table(path: &Path) -> Result<Table> {
    CsvLoader::new(path)
        .load()
        .with_context(|| format!("Cannot load '{}'", path.display()))
}
