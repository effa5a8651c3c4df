// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Handles all cross-cutting persistence concerns that don't
// belong in any specific business layer:
//
//   checkpoint.rs - Saving and loading the full training state
//                   Uses burn's NamedMpkBytesRecorder for the
//                   weights and optimizer state, a bincode
//                   envelope around them, and an atomic
//                   tmp-then-rename write.
//
//   artifacts.rs  - The output directory of a training run
//                   Saves/loads TrainConfig and FeatureSpec as
//                   JSON so generation can rebuild the networks
//                   and the codec.
//
//   metrics.rs    - Training metrics logging
//                   Writes epoch-level Wasserstein estimates
//                   to a CSV file for later plotting.

/// Training state checkpoints
pub mod checkpoint;

/// Config, feature spec and file layout of a run
pub mod artifacts;

/// Training metrics CSV logger
pub mod metrics;
