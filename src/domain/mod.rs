// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types shared by every other layer:
//   - no burn types
//   - no file I/O
//
// It defines what a table is, what can go wrong, and the
// traits through which tables are loaded and stored.

/// Column-oriented table of records
pub mod table;

/// Library error type
pub mod error;

/// Load/store abstractions implemented in the data layer
pub mod traits;
