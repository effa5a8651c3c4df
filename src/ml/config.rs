// ============================================================
// Layer 5 - Training Configuration
// ============================================================
// All hyperparameters of a training run in one struct.
// Serialisable so it can be saved next to the checkpoint and
// reloaded by `generate` / `score` to rebuild the same networks.
//
// Defaults:
//   hidden widths      none (a single Linear layer) for both networks
//   dropout            0.1 for both networks
//   learning rates     1e-4 for both networks
//   critic_steps       15   (every 15th global step updates the generator)
//   critic_gp_factor   5
//   optimizer          AdamHD
//   max_epochs 1000, batch_size 32, test_set_size 16
//   save_every 1, print_every 1

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::{Result, WganError};

// ─── OptimizerKind ────────────────────────────────────────────────────────────
/// The optimizer used for both networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OptimizerKind {
    Adam,
    #[default]
    #[serde(rename = "AdamHD")]
    AdamHd,
}

impl FromStr for OptimizerKind {
    type Err = WganError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Adam" => Ok(OptimizerKind::Adam),
            "AdamHD" => Ok(OptimizerKind::AdamHd),
            other => Err(WganError::UnsupportedOptimizer(other.to_string())),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::Adam => write!(f, "Adam"),
            OptimizerKind::AdamHd => write!(f, "AdamHD"),
        }
    }
}

// ─── InterpolationSampling ────────────────────────────────────────────────────
/// Distribution of the per-row coefficient used to mix real and
/// generated rows for the gradient penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationSampling {
    /// alpha ~ N(0, 1)
    #[default]
    #[serde(rename = "normal")]
    StandardNormal,
    /// alpha ~ U(0, 1)
    Uniform,
}

impl FromStr for InterpolationSampling {
    type Err = WganError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(InterpolationSampling::StandardNormal),
            "uniform" => Ok(InterpolationSampling::Uniform),
            _ => Err(WganError::UnsupportedInterpolation(s.to_string())),
        }
    }
}

// ─── TrainConfig ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub generator_d_hidden: Vec<usize>,
    pub critic_d_hidden:    Vec<usize>,
    pub generator_dropout:  f64,
    pub critic_dropout:     f64,
    pub generator_lr:       f64,
    pub critic_lr:          f64,
    /// Every `critic_steps`-th global step is a generator step
    pub critic_steps:       usize,
    pub critic_gp_factor:   f64,
    /// Noise width; the generator output width when None
    pub generator_d_noise:  Option<usize>,
    pub optimizer:          OptimizerKind,
    pub gp_interpolation:   InterpolationSampling,
    pub max_epochs:         usize,
    pub batch_size:         usize,
    pub test_set_size:      usize,
    pub load_checkpoint:    Option<PathBuf>,
    pub save_checkpoint:    Option<PathBuf>,
    pub save_every:         usize,
    pub print_every:        usize,
    /// Root of every random stream in a run
    pub seed:               u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            generator_d_hidden: Vec::new(),
            critic_d_hidden:    Vec::new(),
            generator_dropout:  0.1,
            critic_dropout:     0.1,
            generator_lr:       1e-4,
            critic_lr:          1e-4,
            critic_steps:       15,
            critic_gp_factor:   5.0,
            generator_d_noise:  None,
            optimizer:          OptimizerKind::AdamHd,
            gp_interpolation:   InterpolationSampling::StandardNormal,
            max_epochs:         1000,
            batch_size:         32,
            test_set_size:      16,
            load_checkpoint:    None,
            save_checkpoint:    None,
            save_every:         1,
            print_every:        1,
            seed:               0,
        }
    }
}

impl TrainConfig {
    /// Reject values that would make training loop forever,
    /// divide by zero, or build an invalid network.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(WganError::InvalidConfig(msg.to_string()));

        if self.critic_steps == 0 {
            return fail("critic_steps must be at least 1");
        }
        if self.batch_size == 0 {
            return fail("batch_size must be at least 1");
        }
        if self.save_every == 0 || self.print_every == 0 {
            return fail("save_every and print_every must be at least 1");
        }
        for (name, p) in [("generator_dropout", self.generator_dropout), ("critic_dropout", self.critic_dropout)] {
            if !(0.0..1.0).contains(&p) {
                return Err(WganError::InvalidConfig(format!("{name} must be in [0, 1), got {p}")));
            }
        }
        for (name, lr) in [("generator_lr", self.generator_lr), ("critic_lr", self.critic_lr)] {
            if !(lr.is_finite() && lr > 0.0) {
                return Err(WganError::InvalidConfig(format!("{name} must be positive, got {lr}")));
            }
        }
        if !(self.critic_gp_factor.is_finite() && self.critic_gp_factor >= 0.0) {
            return fail("critic_gp_factor must be non-negative");
        }
        if self.generator_d_hidden.contains(&0) || self.critic_d_hidden.contains(&0) {
            return fail("hidden layer widths must be at least 1");
        }
        if self.generator_d_noise == Some(0) {
            return fail("generator_d_noise must be at least 1");
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimizer_names() {
        assert_eq!("Adam".parse::<OptimizerKind>().unwrap(), OptimizerKind::Adam);
        assert_eq!("AdamHD".parse::<OptimizerKind>().unwrap(), OptimizerKind::AdamHd);
        assert!(matches!(
            "SGD".parse::<OptimizerKind>(),
            Err(WganError::UnsupportedOptimizer(name)) if name == "SGD"
        ));
        assert_eq!(OptimizerKind::AdamHd.to_string(), "AdamHD");
    }

    #[test]
    fn test_defaults_are_valid() {
        let cfg = TrainConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.critic_steps, 15);
        assert_eq!(cfg.optimizer, OptimizerKind::AdamHd);
    }

    #[test]
    fn test_validate_rejects_zero_critic_steps() {
        let cfg = TrainConfig { critic_steps: 0, ..TrainConfig::default() };
        assert!(matches!(cfg.validate(), Err(WganError::InvalidConfig(_))));
    }

    #[test]
    fn test_json_round_trip_with_partial_input() {
        let cfg: TrainConfig = serde_json::from_str(r#"{"optimizer": "Adam", "batch_size": 10}"#).unwrap();
        assert_eq!(cfg.optimizer, OptimizerKind::Adam);
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.critic_steps, 15);

        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(serde_json::from_str::<TrainConfig>(&json).unwrap(), cfg);
    }
}
