// ============================================================
// tabular-wgan
// ============================================================
// Conditional Wasserstein GAN with gradient penalty for
// synthesizing tabular data, built on burn.
//
//   cli          - Layer 1: argument parsing and printing
//   application  - Layer 2: train / generate / score / compare
//   domain       - Layer 3: Table, errors, source/sink traits
//   data         - Layer 4: CSV I/O, feature codec, batching
//   ml           - Layer 5: networks, optimizers, training loop
//   infra        - Layer 6: checkpoints, artifacts, metrics

#![recursion_limit = "256"]

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
