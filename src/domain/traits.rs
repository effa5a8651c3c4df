// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer loads and stores tables through these
// traits, so a Parquet or database source could replace the
// CSV implementation without touching the use cases.

use crate::domain::error::Result;
use crate::domain::table::Table;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a table of records.
///
/// Implementations:
///   - CsvLoader -> reads a CSV file with a header row
pub trait TableSource {
    fn load(&self) -> Result<Table>;
}

// ─── TableSink ────────────────────────────────────────────────────────────────
/// Any component that can persist a table.
///
/// Implementations:
///   - CsvWriter -> writes a CSV file with a header row
pub trait TableSink {
    fn write(&self, table: &Table) -> Result<()>;
}
