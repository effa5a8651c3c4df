// ============================================================
// Layer 3 - Table Domain Type
// ============================================================
// A small column-oriented table: the unit of data that enters
// and leaves the system. Columns are either numeric (f64) or
// text; every column has the same number of rows.
//
// The table knows nothing about normalisation or one-hot
// encoding. That belongs to the feature codec in Layer 4.

use rand::Rng;

use crate::domain::error::{Result, WganError};

/// One named column of values
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `row` rendered as text, used for error messages and CSV output
    pub fn display_value(&self, row: usize) -> String {
        match self {
            Column::Numeric(v) => v[row].to_string(),
            Column::Text(v) => v[row].clone(),
        }
    }

    /// New column holding the given rows, in the given order
    pub fn select(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&r| v[r]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }
}

/// Ordered collection of equally long named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from (name, column) pairs, checking lengths and names
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Self> {
        let mut table = Table::new();
        for (name, column) in columns {
            table.push_column(name, column)?;
        }
        Ok(table)
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Iterate over (name, column) pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Numeric values of a column, failing if it is missing or text
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column::Numeric(v)) => Ok(v),
            Some(Column::Text(_)) => Err(WganError::NonNumericVariable(name.to_string())),
            None => Err(WganError::MissingVariable(name.to_string())),
        }
    }

    /// Append a column at the end
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let index = self.num_columns();
        self.insert_column(index, name, column)
    }

    /// Insert a column at `index` (clamped to the column count)
    pub fn insert_column(&mut self, index: usize, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(WganError::DuplicateColumn(name));
        }
        self.check_length(&name, &column)?;
        let index = index.min(self.names.len());
        self.names.insert(index, name);
        self.columns.insert(index, column);
        Ok(())
    }

    /// Swap the values of an existing column, keeping its position
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<()> {
        let index = self
            .position(name)
            .ok_or_else(|| WganError::MissingVariable(name.to_string()))?;
        if column.len() != self.columns[index].len() {
            return Err(WganError::ColumnLength {
                column: name.to_string(),
                expected: self.columns[index].len(),
                found: column.len(),
            });
        }
        self.columns[index] = column;
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let index = self.position(name)?;
        self.names.remove(index);
        Some(self.columns.remove(index))
    }

    /// New table with the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(rows)).collect(),
        }
    }

    /// Draw `n` rows uniformly at random.
    /// With `replace == false`, `n` is capped at the row count.
    pub fn sample_rows<R: Rng>(&self, n: usize, replace: bool, rng: &mut R) -> Table {
        let total = self.num_rows();
        if total == 0 {
            return self.select_rows(&[]);
        }
        let rows: Vec<usize> = if replace {
            (0..n).map(|_| rng.gen_range(0..total)).collect()
        } else {
            rand::seq::index::sample(rng, total, n.min(total)).into_vec()
        };
        self.select_rows(&rows)
    }

    fn check_length(&self, name: &str, column: &Column) -> Result<()> {
        if self.columns.is_empty() {
            return Ok(());
        }
        let expected = self.num_rows();
        if column.len() != expected {
            return Err(WganError::ColumnLength {
                column: name.to_string(),
                expected,
                found: column.len(),
            });
        }
        Ok(())
    }
}
