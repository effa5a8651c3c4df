// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `train`    - fits the generator and critic on a CSV table
//   2. `generate` - writes a synthetic version of a CSV table
//   3. `score`    - adds the critic's score of every row
//   4. `compare`  - prints real-vs-fake summary statistics
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, CompareArgs, GenerateArgs, ScoreArgs, TrainArgs};

/// The main CLI struct. clap reads the fields and generates
/// argument parsing code through the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "tabular-wgan",
    version,
    about = "Train a conditional Wasserstein GAN on tabular data, then generate synthetic rows."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Generate(args) => run_generate(args),
            Commands::Score(args)    => run_score(args),
            Commands::Compare(args)  => run_compare(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.data.display());
    let output_dir = args.output_dir.clone();
    let reports = TrainUseCase::new(args.into()).execute()?;

    match reports.last() {
        Some(last) => println!("Training complete. {last}"),
        None => println!("Nothing to train: the checkpoint already reached --max-epochs."),
    }
    println!("Run saved to '{}'", output_dir.display());
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    use crate::application::generate_use_case::GenerateUseCase;

    let table = GenerateUseCase::new(&args.output_dir)?.generate(&args.data, &args.out, args.rows, args.seed)?;
    println!("Wrote {} synthetic rows to '{}'", table.num_rows(), args.out.display());
    Ok(())
}

fn run_score(args: ScoreArgs) -> Result<()> {
    use crate::application::generate_use_case::GenerateUseCase;

    let table = GenerateUseCase::new(&args.output_dir)?.score(&args.data, &args.out, &args.column, args.seed)?;
    println!("Wrote {} scored rows to '{}'", table.num_rows(), args.out.display());
    Ok(())
}

fn run_compare(args: CompareArgs) -> Result<()> {
    use crate::application::compare_use_case::CompareUseCase;

    let report = CompareUseCase::new(args.real, args.fake, args.group_by).execute()?;
    print!("{report}");
    Ok(())
}
