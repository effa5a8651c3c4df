// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the four subcommands: `train`, `generate`, `score`
// and `compare`, with all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, OptimizerKind, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainRequest;
use crate::data::codec::FeatureVariables;
use crate::ml::config::{InterpolationSampling, OptimizerKind, TrainConfig};

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a generator/critic pair on a CSV table
    Train(TrainArgs),

    /// Replace the generated columns of a table with synthetic values
    Generate(GenerateArgs),

    /// Add the critic's score of every row as a new column
    Score(ScoreArgs),

    /// Compare summary statistics of a real and a synthetic table
    Compare(CompareArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with a header row
    #[arg(long)]
    pub data: PathBuf,

    /// Continuous columns to generate, comma separated
    #[arg(long, value_delimiter = ',')]
    pub continuous: Vec<String>,

    /// Categorical columns to generate, comma separated
    #[arg(long, value_delimiter = ',')]
    pub categorical: Vec<String>,

    /// Numeric columns the generator is conditioned on
    #[arg(long, value_delimiter = ',')]
    pub context: Vec<String>,

    /// Lower bound of a continuous column, as name=value (repeatable)
    #[arg(long = "lower-bound", value_parser = parse_bound)]
    pub lower_bounds: Vec<(String, f64)>,

    /// Upper bound of a continuous column, as name=value (repeatable)
    #[arg(long = "upper-bound", value_parser = parse_bound)]
    pub upper_bounds: Vec<(String, f64)>,

    /// Directory for the checkpoint, config, feature spec and metrics
    #[arg(long, default_value = "wgan_run")]
    pub output_dir: PathBuf,

    /// Continue training from the checkpoint in --output-dir
    #[arg(long)]
    pub resume: bool,

    /// Hidden layer widths of the generator, comma separated
    #[arg(long, value_delimiter = ',')]
    pub generator_hidden: Vec<usize>,

    /// Hidden layer widths of the critic, comma separated
    #[arg(long, value_delimiter = ',')]
    pub critic_hidden: Vec<usize>,

    #[arg(long, default_value_t = 0.1)]
    pub generator_dropout: f64,

    #[arg(long, default_value_t = 0.1)]
    pub critic_dropout: f64,

    #[arg(long, default_value_t = 1e-4)]
    pub generator_lr: f64,

    #[arg(long, default_value_t = 1e-4)]
    pub critic_lr: f64,

    /// Every N-th global step updates the generator, the rest the critic
    #[arg(long, default_value_t = 15)]
    pub critic_steps: usize,

    /// Weight of the gradient penalty in the critic loss
    #[arg(long, default_value_t = 5.0)]
    pub critic_gp_factor: f64,

    /// Width of the generator's noise input (defaults to its output width)
    #[arg(long)]
    pub generator_d_noise: Option<usize>,

    /// Adam or AdamHD
    #[arg(long, default_value = "AdamHD")]
    pub optimizer: OptimizerKind,

    /// Distribution of the penalty interpolation coefficient: normal or uniform
    #[arg(long, default_value = "normal")]
    pub gp_interpolation: InterpolationSampling,

    #[arg(long, default_value_t = 1000)]
    pub max_epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Rows held out to estimate the Wasserstein distance
    #[arg(long, default_value_t = 16)]
    pub test_set_size: usize,

    /// Save a checkpoint every N epochs
    #[arg(long, default_value_t = 1)]
    pub save_every: usize,

    /// Log a progress line every N epochs
    #[arg(long, default_value_t = 1)]
    pub print_every: usize,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// Parse `name=value` into a bound entry
fn parse_bound(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid bound '{value}': {e}"))?;
    Ok((name.trim().to_string(), value))
}

/// Convert CLI TrainArgs into the application-layer TrainRequest.
/// This is the boundary between Layer 1 and Layer 2:
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainRequest {
    fn from(a: TrainArgs) -> Self {
        let mut variables = FeatureVariables::new(a.continuous, a.categorical, a.context);
        variables.lower_bounds.extend(a.lower_bounds);
        variables.upper_bounds.extend(a.upper_bounds);

        TrainRequest {
            data:       a.data,
            variables,
            output_dir: a.output_dir,
            resume:     a.resume,
            config:     TrainConfig {
                generator_d_hidden: a.generator_hidden,
                critic_d_hidden:    a.critic_hidden,
                generator_dropout:  a.generator_dropout,
                critic_dropout:     a.critic_dropout,
                generator_lr:       a.generator_lr,
                critic_lr:          a.critic_lr,
                critic_steps:       a.critic_steps,
                critic_gp_factor:   a.critic_gp_factor,
                generator_d_noise:  a.generator_d_noise,
                optimizer:          a.optimizer,
                gp_interpolation:   a.gp_interpolation,
                max_epochs:         a.max_epochs,
                batch_size:         a.batch_size,
                test_set_size:      a.test_set_size,
                load_checkpoint:    None,
                save_checkpoint:    None,
                save_every:         a.save_every,
                print_every:        a.print_every,
                seed:               a.seed,
            },
        }
    }
}

/// All arguments for the `generate` command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Table whose context columns condition the generator
    #[arg(long)]
    pub data: PathBuf,

    /// Directory of a finished `train` run
    #[arg(long, default_value = "wgan_run")]
    pub output_dir: PathBuf,

    /// Where to write the synthetic CSV
    #[arg(long)]
    pub out: PathBuf,

    /// Number of rows to draw from --data with replacement (all rows when omitted)
    #[arg(long)]
    pub rows: Option<usize>,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// All arguments for the `score` command
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Table to score
    #[arg(long)]
    pub data: PathBuf,

    /// Directory of a finished `train` run
    #[arg(long, default_value = "wgan_run")]
    pub output_dir: PathBuf,

    /// Where to write the scored CSV
    #[arg(long)]
    pub out: PathBuf,

    /// Name of the score column
    #[arg(long, default_value = "critic")]
    pub column: String,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// All arguments for the `compare` command
#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(long)]
    pub real: PathBuf,

    #[arg(long)]
    pub fake: PathBuf,

    /// Columns to split the statistics by, comma separated
    #[arg(long, value_delimiter = ',')]
    pub group_by: Vec<String>,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn train_args(args: &[&str]) -> TrainArgs {
        let cli = Cli::try_parse_from(std::iter::once("tabular-wgan").chain(args.iter().copied())).unwrap();
        match cli.command {
            Commands::Train(a) => a,
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_match_train_config() {
        let request: TrainRequest = train_args(&["train", "--data", "d.csv", "--continuous", "x"]).into();
        let expected = TrainConfig::default();
        assert_eq!(request.config, expected);
        assert!(!request.resume);
    }

    #[test]
    fn test_variables_and_bounds() {
        let request: TrainRequest = train_args(&[
            "train",
            "--data", "d.csv",
            "--continuous", "income,age",
            "--categorical", "level",
            "--context", "t",
            "--lower-bound", "income=0",
            "--upper-bound", "age=120.5",
            "--generator-hidden", "64,32",
            "--optimizer", "Adam",
            "--gp-interpolation", "uniform",
        ])
        .into();

        assert_eq!(request.variables.continuous, vec!["income", "age"]);
        assert_eq!(request.variables.categorical, vec!["level"]);
        assert_eq!(request.variables.context, vec!["t"]);
        assert_eq!(request.variables.lower_bounds.get("income"), Some(&0.0));
        assert_eq!(request.variables.upper_bounds.get("age"), Some(&120.5));
        assert_eq!(request.config.generator_d_hidden, vec![64, 32]);
        assert_eq!(request.config.optimizer, OptimizerKind::Adam);
        assert_eq!(request.config.gp_interpolation, InterpolationSampling::Uniform);
    }

    #[test]
    fn test_bad_bound_and_optimizer_rejected() {
        assert!(parse_bound("income").is_err());
        assert!(parse_bound("income=abc").is_err());
        assert_eq!(parse_bound(" y = -2 ").unwrap(), ("y".to_string(), -2.0));

        let parsed = Cli::try_parse_from(["tabular-wgan", "train", "--data", "d.csv", "--optimizer", "SGD"]);
        assert!(parsed.is_err());
    }
}
