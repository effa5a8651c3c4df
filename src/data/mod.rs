// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// This layer handles everything from a CSV file on disk to
// tensor batches, and the way back to a table.
//
// The pipeline flows in this order:
//
//   .csv file
//       │
//       ▼
//   CsvLoader         → reads the file into a Table
//       │
//       ▼
//   FeatureSpec       → z-scores continuous/context columns,
//       │               one-hot encodes categorical columns
//       ▼
//   splitter          → held-out test rows, shuffled batches
//       │
//       ▼
//   TabularBatcher    → gathers rows into (x, context) tensors
//       │
//       ▼
//   training loop (Layer 5)
//
// On the way back, FeatureSpec::decode turns generator output
// into a Table and CsvWriter stores it. compare_tables puts a
// synthetic table next to the real one.

/// Reads and writes CSV files as Tables
pub mod loader;

/// Feature specification: encode and decode tables
pub mod codec;

/// Train/test split and mini-batch shuffling
pub mod splitter;

/// Builds (x, context) tensor batches from encoded rows
pub mod batcher;

/// Descriptive real vs synthetic comparison
pub mod compare;
