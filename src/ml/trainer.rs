// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Alternating WGAN-GP training of the generator and critic.
//
// Step schedule (global_step starts at 1 and is never reset):
//   global_step % critic_steps == 0  → generator step
//   otherwise                        → critic step
//
// Critic step (generator frozen):
//   x_hat = generator(context), detached
//   WD    = mean(critic(x)) - mean(critic(x_hat))
//   loss  = -WD + gp_factor * gradient_penalty
//
// Generator step (critic frozen):
//   loss  = -mean(critic(generator(context)))
//
// Freezing: the frozen network is a `no_grad()` copy, and only
// the active network's gradients are pulled out of the graph
// with GradientsParams::from_grads(.., &active).
//
// After every epoch the held-out rows are scored on the inner
// backend (`model.valid()`, no autodiff, no dropout).
//
// Randomness: each concern draws from its own StdRng derived
// from the run seed (split, per-epoch shuffle, per-step noise
// and dropout, per-epoch evaluation). A run resumed from a
// checkpoint therefore replays the uninterrupted run.

use std::fmt;
use std::time::Instant;

use burn::{
    module::AutodiffModule,
    optim::GradientsParams,
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::{TabularBatch, TabularBatcher};
use crate::data::codec::{EncodedTable, FeatureSpec};
use crate::data::splitter::{shuffled_batches, split_train_test};
use crate::domain::error::{Result, WganError};
use crate::infra::checkpoint::{decode_record, encode_record, CheckpointManager, TrainingCheckpoint};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::config::TrainConfig;
use crate::ml::critic::{Critic, CriticConfig};
use crate::ml::generator::{Generator, GeneratorConfig};
use crate::ml::layers::{record_layer_dims, stream_rng, Stream};
use crate::ml::optimizer::WganOptimizer;

// ─── StepKind ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Critic,
    Generator,
}

impl StepKind {
    pub fn for_step(global_step: usize, critic_steps: usize) -> Self {
        if global_step % critic_steps == 0 {
            StepKind::Generator
        } else {
            StepKind::Critic
        }
    }
}

// ─── RunningMean ──────────────────────────────────────────────────────────────
/// Mean of a stream of values; undefined until one value arrives
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningMean {
    sum:   f64,
    count: usize,
}

impl RunningMean {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

// ─── EpochReport ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    pub epoch:       usize,
    /// Step counter after the epoch
    pub global_step: usize,
    pub wd_test:     Option<f64>,
    pub wd_train:    Option<f64>,
    /// Seconds since the previous printed report
    pub seconds:     f64,
}

impl From<&EpochReport> for EpochMetrics {
    fn from(r: &EpochReport) -> Self {
        EpochMetrics {
            epoch:    r.epoch,
            step:     r.global_step,
            wd_test:  r.wd_test,
            wd_train: r.wd_train,
            seconds:  r.seconds,
        }
    }
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wd = |v: Option<f64>| match v {
            Some(x) => format!("{x:.2}"),
            None => "n/a".to_string(),
        };
        write!(
            f,
            "epoch {} | step {} | WD_test {} | WD_train {} | sec passed {:.0} |",
            self.epoch,
            self.global_step,
            wd(self.wd_test),
            wd(self.wd_train),
            self.seconds
        )
    }
}

// ─── WganTrainer ──────────────────────────────────────────────────────────────
/// Owns both networks, both optimizers and the step counters
pub struct WganTrainer<B: AutodiffBackend> {
    config:              TrainConfig,
    generator:           Generator<B>,
    critic:              Critic<B>,
    generator_optimizer: WganOptimizer<Generator<B>, B>,
    critic_optimizer:    WganOptimizer<Critic<B>, B>,
    /// Next epoch to run, 0-based
    epoch:               usize,
    /// Next step to run, 1-based
    global_step:         usize,
    device:              B::Device,
    metrics:             Option<MetricsLogger>,
}

impl<B: AutodiffBackend> WganTrainer<B> {
    /// Build fresh networks for `spec`, then restore from
    /// `config.load_checkpoint` if one is set.
    pub fn new(config: TrainConfig, spec: &FeatureSpec, device: B::Device) -> Result<Self> {
        config.validate()?;
        if spec.x_width() == 0 {
            return Err(WganError::InvalidConfig(
                "at least one continuous or categorical variable is required".into(),
            ));
        }

        let mut rng = stream_rng(config.seed, Stream::Init, 0);
        let generator = GeneratorConfig::from_spec(&config, spec).init(&device, &mut rng);
        let critic = CriticConfig::from_spec(&config, spec).init(&device, &mut rng);
        tracing::info!(
            "Generator layers {:?}, critic layers {:?}, optimizer {}",
            generator.layer_dims(),
            critic.layer_dims(),
            config.optimizer
        );

        let mut trainer = Self {
            generator_optimizer: WganOptimizer::new(config.optimizer),
            critic_optimizer: WganOptimizer::new(config.optimizer),
            generator,
            critic,
            epoch: 0,
            global_step: 1,
            device,
            metrics: None,
            config,
        };

        if let Some(path) = trainer.config.load_checkpoint.clone() {
            let checkpoint = CheckpointManager::new(path).load()?;
            trainer.restore(&checkpoint)?;
        }
        Ok(trainer)
    }

    /// Append every epoch to a metrics CSV
    pub fn with_metrics(mut self, logger: MetricsLogger) -> Self {
        self.metrics = Some(logger);
        self
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn generator(&self) -> &Generator<B> {
        &self.generator
    }

    pub fn critic(&self) -> &Critic<B> {
        &self.critic
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn global_step(&self) -> usize {
        self.global_step
    }

    pub fn into_models(self) -> (Generator<B>, Critic<B>) {
        (self.generator, self.critic)
    }

    // ─── Training ────────────────────────────────────────────────────────────

    /// Train from the current epoch up to `max_epochs`.
    /// Returns one report per epoch run.
    pub fn fit(&mut self, data: &EncodedTable) -> Result<Vec<EpochReport>> {
        self.check_widths(data)?;

        let mut split_rng = stream_rng(self.config.seed, Stream::Split, 0);
        let (train_rows, test_rows) = split_train_test(data.rows, self.config.test_set_size, &mut split_rng)?;
        tracing::info!(
            "Training on {} rows, {} held out; epochs {}..{}",
            train_rows.len(),
            test_rows.len(),
            self.epoch,
            self.config.max_epochs
        );

        // Training batches carry autodiff, evaluation batches do not
        let train_batcher = TabularBatcher::<B>::new(self.device.clone());
        let eval_batcher = TabularBatcher::<B::InnerBackend>::new(self.device.clone());
        let checkpoints = self.config.save_checkpoint.clone().map(CheckpointManager::new);

        let mut reports = Vec::new();
        let mut clock = Instant::now();

        while self.epoch < self.config.max_epochs {
            let epoch = self.epoch;
            let wd_train = self.train_epoch(data, &train_rows, &train_batcher);
            let wd_test = self.evaluate(data, &test_rows, &eval_batcher);

            if wd_train.is_none() {
                tracing::warn!("Epoch {epoch}: no critic updates, WD_train undefined");
            }

            let report = EpochReport {
                epoch,
                global_step: self.global_step,
                wd_test,
                wd_train,
                seconds: clock.elapsed().as_secs_f64(),
            };
            if epoch % self.config.print_every == 0 {
                tracing::info!("{report}");
                clock = Instant::now();
            }
            if let Some(logger) = &self.metrics {
                logger.log(&EpochMetrics::from(&report))?;
            }

            self.epoch += 1;
            if let Some(manager) = &checkpoints {
                if epoch % self.config.save_every == 0 {
                    manager.save(&self.snapshot()?)?;
                }
            }
            reports.push(report);
        }

        tracing::info!("Training complete at epoch {}, step {}", self.epoch, self.global_step);
        Ok(reports)
    }

    fn train_epoch(
        &mut self,
        data:    &EncodedTable,
        rows:    &[usize],
        batcher: &TabularBatcher<B>,
    ) -> Option<f64> {
        let mut shuffle_rng = stream_rng(self.config.seed, Stream::Shuffle, self.epoch as u64);
        let mut wd_train = RunningMean::default();

        for batch_rows in shuffled_batches(rows, self.config.batch_size, &mut shuffle_rng) {
            let batch = batcher.batch(data, &batch_rows);
            match StepKind::for_step(self.global_step, self.config.critic_steps) {
                StepKind::Generator => self.generator_step(batch),
                StepKind::Critic => wd_train.push(self.critic_step(batch)),
            }
            self.global_step += 1;
        }

        tracing::debug!("Epoch {}: {} critic updates", self.epoch, wd_train.count());
        wd_train.mean()
    }

    /// One critic update; returns the batch Wasserstein estimate
    fn critic_step(&mut self, batch: TabularBatch<B>) -> f64 {
        let mut rng = stream_rng(self.config.seed, Stream::Step, self.global_step as u64);
        let TabularBatch { x, context } = batch;

        let frozen = self.generator.clone().no_grad();
        let x_hat = frozen.forward(context.clone(), &mut rng).detach();

        let critic_x = self.critic.forward(x.clone(), context.clone(), &mut rng).mean();
        let critic_x_hat = self.critic.forward(x_hat.clone(), context.clone(), &mut rng).mean();
        let wd = critic_x - critic_x_hat;

        let penalty = self
            .critic
            .gradient_penalty(x, x_hat, context, self.config.gp_interpolation, &mut rng);
        let loss = wd.clone().neg() + penalty.mul_scalar(self.config.critic_gp_factor);

        let wd_value = wd.into_scalar().elem::<f64>();
        let grads = GradientsParams::from_grads(loss.backward(), &self.critic);
        self.critic = self
            .critic_optimizer
            .step(self.config.critic_lr, self.critic.clone(), grads);
        wd_value
    }

    fn generator_step(&mut self, batch: TabularBatch<B>) {
        let mut rng = stream_rng(self.config.seed, Stream::Step, self.global_step as u64);
        let TabularBatch { context, .. } = batch;

        let frozen = self.critic.clone().no_grad();
        let x_hat = self.generator.forward(context.clone(), &mut rng);
        let loss = frozen.forward(x_hat, context, &mut rng).mean().neg();

        let grads = GradientsParams::from_grads(loss.backward(), &self.generator);
        self.generator = self
            .generator_optimizer
            .step(self.config.generator_lr, self.generator.clone(), grads);
    }

    /// Mean Wasserstein estimate over the held-out rows,
    /// None when there are none
    fn evaluate(
        &self,
        data:    &EncodedTable,
        rows:    &[usize],
        batcher: &TabularBatcher<B::InnerBackend>,
    ) -> Option<f64> {
        // valid() → models on the inner backend, dropout disabled
        let generator = self.generator.valid();
        let critic = self.critic.valid();
        let mut rng = stream_rng(self.config.seed, Stream::Evaluation, self.epoch as u64);
        let mut wd_test = RunningMean::default();

        for chunk in rows.chunks(self.config.batch_size) {
            let TabularBatch { x, context } = batcher.batch(data, chunk);
            let x_hat = generator.forward(context.clone(), &mut rng);
            let critic_x = critic.forward(x, context.clone(), &mut rng).mean();
            let critic_x_hat = critic.forward(x_hat, context, &mut rng).mean();
            wd_test.push((critic_x - critic_x_hat).into_scalar().elem::<f64>());
        }
        wd_test.mean()
    }

    fn check_widths(&self, data: &EncodedTable) -> Result<()> {
        let d_x = self.critic.d_x;
        let d_context = self.critic.layer_dims()[0][0] - d_x;
        if data.x_width != d_x {
            return Err(WganError::WidthMismatch { what: "x", expected: d_x, found: data.x_width });
        }
        if data.context_width != d_context {
            return Err(WganError::WidthMismatch {
                what: "context",
                expected: d_context,
                found: data.context_width,
            });
        }
        Ok(())
    }

    // ─── Checkpointing ───────────────────────────────────────────────────────

    /// Capture the full training state
    pub fn snapshot(&self) -> Result<TrainingCheckpoint> {
        Ok(TrainingCheckpoint {
            epoch:               self.epoch,
            global_step:         self.global_step,
            optimizer:           self.config.optimizer,
            generator:           encode_record::<B, _>(self.generator.clone().into_record())?,
            critic:              encode_record::<B, _>(self.critic.clone().into_record())?,
            generator_optimizer: self.generator_optimizer.to_bytes()?,
            critic_optimizer:    self.critic_optimizer.to_bytes()?,
        })
    }

    /// Replace the training state with `checkpoint`.
    /// Nothing changes when the checkpoint does not fit.
    pub fn restore(&mut self, checkpoint: &TrainingCheckpoint) -> Result<()> {
        if checkpoint.optimizer != self.config.optimizer {
            return Err(WganError::OptimizerMismatch {
                expected: self.config.optimizer.to_string(),
                found: checkpoint.optimizer.to_string(),
            });
        }

        // Shapes are compared on the records: burn's load_record
        // panics when the layer counts differ.
        let generator_record: <Generator<B> as Module<B>>::Record =
            decode_record(checkpoint.generator.clone(), &self.device)?;
        ensure_same_layers("generator", self.generator.layer_dims(), record_layer_dims(&generator_record.layers))?;

        let critic_record: <Critic<B> as Module<B>>::Record = decode_record(checkpoint.critic.clone(), &self.device)?;
        ensure_same_layers("critic", self.critic.layer_dims(), record_layer_dims(&critic_record.layers))?;

        let generator = self.generator.clone().load_record(generator_record);
        let critic = self.critic.clone().load_record(critic_record);

        let generator_optimizer = WganOptimizer::new(checkpoint.optimizer)
            .load_bytes(checkpoint.generator_optimizer.clone(), &self.device)?;
        let critic_optimizer = WganOptimizer::new(checkpoint.optimizer)
            .load_bytes(checkpoint.critic_optimizer.clone(), &self.device)?;

        self.generator = generator;
        self.critic = critic;
        self.generator_optimizer = generator_optimizer;
        self.critic_optimizer = critic_optimizer;
        self.epoch = checkpoint.epoch;
        self.global_step = checkpoint.global_step;
        tracing::info!("Restored training state at epoch {}, step {}", self.epoch, self.global_step);
        Ok(())
    }
}

fn ensure_same_layers(network: &'static str, expected: Vec<[usize; 2]>, found: Vec<[usize; 2]>) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(WganError::ArchitectureMismatch { network, expected, found })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::codec::FeatureVariables;
    use crate::domain::table::{Column, Table};
    use crate::ml::config::OptimizerKind;
    use burn::backend::{Autodiff, NdArray};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rand_distr::StandardNormal;

    type TestBackend = Autodiff<NdArray>;

    /// 100 rows: two continuous, one 3-level categorical, one context
    fn scenario_table() -> Table {
        let mut rng = StdRng::seed_from_u64(11);
        let t: Vec<f64> = (0..100).map(|i| (i % 2) as f64).collect();
        let income: Vec<f64> = t
            .iter()
            .map(|t| (1000.0 + 500.0 * t + 300.0 * rng.sample::<f64, _>(StandardNormal)).max(0.0))
            .collect();
        let age: Vec<f64> = (0..100).map(|_| rng.gen_range(18.0..65.0)).collect();
        let level: Vec<String> = (0..100).map(|i| ["low", "mid", "high"][i % 3].to_string()).collect();

        Table::from_columns(vec![
            ("income".into(), Column::Numeric(income)),
            ("age".into(), Column::Numeric(age)),
            ("level".into(), Column::Text(level)),
            ("t".into(), Column::Numeric(t)),
        ])
        .unwrap()
    }

    fn scenario_spec(table: &Table) -> FeatureSpec {
        let variables = FeatureVariables::new(["income", "age"], ["level"], ["t"]).with_lower_bound("income", 0.0);
        FeatureSpec::build(table, &variables).unwrap()
    }

    fn scenario_config() -> TrainConfig {
        TrainConfig {
            generator_d_hidden: vec![16],
            critic_d_hidden: vec![16],
            critic_steps: 5,
            batch_size: 10,
            max_epochs: 2,
            seed: 42,
            ..TrainConfig::default()
        }
    }

    fn weights(generator: &Generator<TestBackend>) -> Vec<f32> {
        generator
            .layers
            .iter()
            .flat_map(|l| l.weight.val().into_data().to_vec::<f32>().unwrap())
            .collect()
    }

    #[test]
    fn test_step_parity() {
        assert_eq!(StepKind::for_step(15, 15), StepKind::Generator);
        assert_eq!(StepKind::for_step(14, 15), StepKind::Critic);
        for critic_steps in 1..=7 {
            for start in 1..30 {
                let generators = (start..start + critic_steps)
                    .filter(|&s| StepKind::for_step(s, critic_steps) == StepKind::Generator)
                    .count();
                assert_eq!(generators, 1, "window {start}, critic_steps {critic_steps}");
            }
        }
    }

    #[test]
    fn test_running_mean() {
        let mut mean = RunningMean::default();
        assert_eq!(mean.mean(), None);
        mean.push(1.0);
        mean.push(2.0);
        assert_eq!(mean.mean(), Some(1.5));
    }

    #[test]
    fn test_report_line() {
        let report = EpochReport { epoch: 3, global_step: 40, wd_test: Some(0.123), wd_train: None, seconds: 2.4 };
        assert_eq!(report.to_string(), "epoch 3 | step 40 | WD_test 0.12 | WD_train n/a | sec passed 2 |");
    }

    #[test]
    fn test_scenario_trains_two_epochs() {
        let table = scenario_table();
        let spec = scenario_spec(&table);
        assert_eq!(spec.x_width(), 5);
        let data = spec.encode(&table).unwrap();

        let device = Default::default();
        let mut trainer = WganTrainer::<TestBackend>::new(scenario_config(), &spec, device).unwrap();
        let reports = trainer.fit(&data).unwrap();

        // 84 training rows in batches of 10 → 9 steps per epoch
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].global_step, 10);
        assert_eq!(trainer.global_step(), 19);
        assert_eq!(trainer.epoch(), 2);
        for report in &reports {
            assert!(report.wd_test.unwrap().is_finite());
            assert!(report.wd_train.unwrap().is_finite());
        }

        let (generator, _) = trainer.into_models();
        let context = Tensor::<TestBackend, 2>::zeros([7, 1], &Default::default());
        assert_eq!(generator.forward(context, &mut StdRng::seed_from_u64(0)).dims(), [7, 5]);

        let synthetic = spec
            .apply_generator(&generator.valid(), &table, &Default::default(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(synthetic.column_names(), table.column_names());
        assert!(synthetic.numeric("income").unwrap().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_resume_matches_uninterrupted_run() {
        let table = scenario_table();
        let spec = scenario_spec(&table);
        let data = spec.encode(&table).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wgan.ckpt");

        // Two epochs in one go
        let mut straight = WganTrainer::<TestBackend>::new(scenario_config(), &spec, Default::default()).unwrap();
        let straight_reports = straight.fit(&data).unwrap();

        // One epoch, checkpoint, then a fresh trainer finishes the second
        let first = TrainConfig { max_epochs: 1, save_checkpoint: Some(path.clone()), ..scenario_config() };
        WganTrainer::<TestBackend>::new(first, &spec, Default::default())
            .unwrap()
            .fit(&data)
            .unwrap();
        assert_eq!(CheckpointManager::new(&path).load().unwrap().epoch, 1);

        let second = TrainConfig { load_checkpoint: Some(path), ..scenario_config() };
        let mut resumed = WganTrainer::<TestBackend>::new(second, &spec, Default::default()).unwrap();
        assert_eq!(resumed.epoch(), 1);
        let resumed_reports = resumed.fit(&data).unwrap();

        assert_eq!(resumed_reports.len(), 1);
        assert_eq!(resumed_reports[0].epoch, 1);
        assert_eq!(resumed.global_step(), straight.global_step());

        let (a, b) = (straight_reports[1].wd_test.unwrap(), resumed_reports[0].wd_test.unwrap());
        assert!((a - b).abs() < 1e-6, "WD_test {a} vs {b}");
        for (a, b) in weights(straight.generator()).iter().zip(weights(resumed.generator())) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_restore_rejects_other_architecture() {
        let table = scenario_table();
        let spec = scenario_spec(&table);
        let trained = WganTrainer::<TestBackend>::new(scenario_config(), &spec, Default::default()).unwrap();
        let checkpoint = trained.snapshot().unwrap();

        let wider = TrainConfig { generator_d_hidden: vec![32], ..scenario_config() };
        let mut other = WganTrainer::<TestBackend>::new(wider, &spec, Default::default()).unwrap();
        match other.restore(&checkpoint) {
            Err(WganError::ArchitectureMismatch { network, .. }) => assert_eq!(network, "generator"),
            other => panic!("expected architecture mismatch, got {:?}", other.err()),
        }
        assert_eq!(other.epoch(), 0);
    }

    #[test]
    fn test_restore_rejects_other_layer_count() {
        let table = scenario_table();
        let spec = scenario_spec(&table);
        let checkpoint = WganTrainer::<TestBackend>::new(scenario_config(), &spec, Default::default())
            .unwrap()
            .snapshot()
            .unwrap();

        let deeper = TrainConfig { generator_d_hidden: vec![16, 16], ..scenario_config() };
        let mut other = WganTrainer::<TestBackend>::new(deeper, &spec, Default::default()).unwrap();
        match other.restore(&checkpoint) {
            Err(WganError::ArchitectureMismatch { network, expected, found }) => {
                assert_eq!(network, "generator");
                assert_eq!(expected.len(), 3);
                assert_eq!(found.len(), 2);
            }
            other => panic!("expected architecture mismatch, got {:?}", other.err()),
        }

        let shallow = TrainConfig { critic_d_hidden: Vec::new(), ..scenario_config() };
        let mut other = WganTrainer::<TestBackend>::new(shallow, &spec, Default::default()).unwrap();
        assert!(matches!(
            other.restore(&checkpoint),
            Err(WganError::ArchitectureMismatch { network: "critic", .. })
        ));
        assert_eq!(other.global_step(), 1);
    }

    #[test]
    fn test_generator_only_epochs_have_no_train_estimate() {
        let table = scenario_table();
        let spec = scenario_spec(&table);
        let data = spec.encode(&table).unwrap();

        let config = TrainConfig { critic_steps: 1, max_epochs: 1, ..scenario_config() };
        let mut trainer = WganTrainer::<TestBackend>::new(config, &spec, Default::default()).unwrap();
        let reports = trainer.fit(&data).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].wd_train, None);
        assert!(reports[0].wd_test.unwrap().is_finite());
        assert_eq!(trainer.global_step(), 10);
    }

    #[test]
    fn test_restore_rejects_other_optimizer() {
        let table = scenario_table();
        let spec = scenario_spec(&table);
        let adam = TrainConfig { optimizer: OptimizerKind::Adam, ..scenario_config() };
        let checkpoint = WganTrainer::<TestBackend>::new(adam, &spec, Default::default())
            .unwrap()
            .snapshot()
            .unwrap();

        let mut hd = WganTrainer::<TestBackend>::new(scenario_config(), &spec, Default::default()).unwrap();
        assert!(matches!(hd.restore(&checkpoint), Err(WganError::OptimizerMismatch { .. })));
    }

    #[test]
    fn test_missing_checkpoint_fails_at_start() {
        let table = scenario_table();
        let spec = scenario_spec(&table);
        let dir = tempfile::tempdir().unwrap();
        let config = TrainConfig { load_checkpoint: Some(dir.path().join("none.ckpt")), ..scenario_config() };
        assert!(matches!(
            WganTrainer::<TestBackend>::new(config, &spec, Default::default()),
            Err(WganError::Checkpoint(_))
        ));
    }

    #[test]
    fn test_empty_test_split_reports_none() {
        let table = scenario_table();
        let spec = scenario_spec(&table);
        let data = spec.encode(&table).unwrap();
        let config = TrainConfig { test_set_size: 0, max_epochs: 1, ..scenario_config() };
        let mut trainer = WganTrainer::<TestBackend>::new(config, &spec, Default::default()).unwrap();
        let reports = trainer.fit(&data).unwrap();
        assert_eq!(reports[0].wd_test, None);
        assert!(reports[0].wd_train.is_some());
    }
}
