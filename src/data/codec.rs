// ============================================================
// Layer 4 - Feature Codec
// ============================================================
// Converts between tables and the numeric matrices the
// networks consume.
//
// Encoding, per row:
//   x       = [ z-scored continuous | one-hot block per categorical ]
//   context = [ z-scored context ]
//
// Decoding reverses this: continuous values are de-normalised
// with value * std + mean, and each categorical block is turned
// back into a level by sampling proportionally to its entries.
// A hard one-hot block therefore always decodes to its level,
// while a softmax block from the generator yields a random draw.
//
// The statistics and levels are computed once, from the
// reference table, and never recomputed from later inputs.

use std::collections::BTreeMap;

use burn::prelude::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::batcher::{matrix, to_host};
use crate::domain::error::{Result, WganError};
use crate::domain::table::{Column, Table};
use crate::ml::critic::Critic;
use crate::ml::generator::Generator;

/// Raw-unit bound used when none is given for a continuous variable
pub const UNBOUNDED: f64 = 1e8;

/// Added to every standard deviation so constant columns stay finite
pub const STD_EPSILON: f64 = 1e-5;

// ─── FeatureVariables ─────────────────────────────────────────────────────────
/// Which columns play which role, plus optional raw-unit bounds
/// for continuous variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVariables {
    pub continuous: Vec<String>,
    pub categorical: Vec<String>,
    pub context: Vec<String>,
    #[serde(default)]
    pub lower_bounds: BTreeMap<String, f64>,
    #[serde(default)]
    pub upper_bounds: BTreeMap<String, f64>,
}

impl FeatureVariables {
    pub fn new(
        continuous: impl IntoIterator<Item = impl Into<String>>,
        categorical: impl IntoIterator<Item = impl Into<String>>,
        context: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            continuous: continuous.into_iter().map(Into::into).collect(),
            categorical: categorical.into_iter().map(Into::into).collect(),
            context: context.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_lower_bound(mut self, name: impl Into<String>, bound: f64) -> Self {
        self.lower_bounds.insert(name.into(), bound);
        self
    }

    pub fn with_upper_bound(mut self, name: impl Into<String>, bound: f64) -> Self {
        self.upper_bounds.insert(name.into(), bound);
        self
    }
}

// ─── ColumnStats ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    /// Sample standard deviation (n - 1) plus STD_EPSILON
    pub std: f64,
}

impl ColumnStats {
    fn of(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = if values.len() < 2 {
            0.0
        } else {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
        };
        Self {
            mean,
            std: variance.sqrt() + STD_EPSILON,
        }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }

    pub fn denormalize(&self, value: f64) -> f64 {
        value * self.std + self.mean
    }
}

// ─── Levels ───────────────────────────────────────────────────────────────────
/// Sorted distinct values of a categorical variable.
/// The position of a level is its one-hot index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum Levels {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Levels {
    fn of(column: &Column) -> Self {
        match column {
            Column::Numeric(values) => {
                let mut levels = values.clone();
                levels.sort_by(f64::total_cmp);
                levels.dedup();
                Levels::Numeric(levels)
            }
            Column::Text(values) => {
                let mut levels = values.clone();
                levels.sort();
                levels.dedup();
                Levels::Text(levels)
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Levels::Numeric(v) => v.len(),
            Levels::Text(v) => v.len(),
        }
    }

    pub fn label(&self, index: usize) -> String {
        match self {
            Levels::Numeric(v) => v[index].to_string(),
            Levels::Text(v) => v[index].clone(),
        }
    }

    /// One-hot index of the value at `row`, if it is a known level.
    /// A column whose type differs from the reference is matched by label.
    fn index_of(&self, column: &Column, row: usize) -> Option<usize> {
        match (self, column) {
            (Levels::Numeric(levels), Column::Numeric(values)) => {
                levels.iter().position(|l| *l == values[row])
            }
            (Levels::Text(levels), Column::Text(values)) => {
                levels.iter().position(|l| *l == values[row])
            }
            _ => {
                let value = column.display_value(row);
                (0..self.len()).find(|&i| self.label(i) == value)
            }
        }
    }

    fn column_from_indices(&self, indices: &[usize]) -> Column {
        match self {
            Levels::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Levels::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalVariable {
    pub name: String,
    pub levels: Levels,
}

// ─── EncodedTable ─────────────────────────────────────────────────────────────
/// Row-major host matrices produced by `FeatureSpec::encode`
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTable {
    pub x: Vec<f32>,
    pub context: Vec<f32>,
    pub rows: usize,
    pub x_width: usize,
    pub context_width: usize,
}

impl EncodedTable {
    pub fn x_row(&self, row: usize) -> &[f32] {
        &self.x[row * self.x_width..(row + 1) * self.x_width]
    }

    pub fn context_row(&self, row: usize) -> &[f32] {
        &self.context[row * self.context_width..(row + 1) * self.context_width]
    }

    /// Both matrices as [rows, width] tensors on `device`
    pub fn to_tensors<B: Backend>(&self, device: &B::Device) -> (Tensor<B, 2>, Tensor<B, 2>) {
        (
            matrix(self.x.clone(), self.rows, self.x_width, device),
            matrix(self.context.clone(), self.rows, self.context_width, device),
        )
    }

    /// Read tensors back to the host
    pub fn from_tensors<B: Backend>(x: Tensor<B, 2>, context: Tensor<B, 2>) -> Result<Self> {
        let [rows, x_width] = x.dims();
        let [context_rows, context_width] = context.dims();
        if context_rows != rows {
            return Err(WganError::WidthMismatch {
                what: "context rows",
                expected: rows,
                found: context_rows,
            });
        }
        Ok(Self {
            x: to_host(x)?,
            context: to_host(context)?,
            rows,
            x_width,
            context_width,
        })
    }
}

// ─── FeatureSpec ──────────────────────────────────────────────────────────────
/// Everything needed to encode and decode tables consistently.
/// Serialisable so a later process can generate without the
/// reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    continuous: Vec<String>,
    categorical: Vec<CategoricalVariable>,
    context: Vec<String>,
    continuous_stats: Vec<ColumnStats>,
    context_stats: Vec<ColumnStats>,
    /// Raw-unit bounds, one per continuous variable
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<f64>,
}

impl FeatureSpec {
    /// Compute statistics, levels and bounds from the reference table.
    ///
    /// # Errors
    /// Empty table, missing or non-numeric column, a variable listed
    /// twice, or a bound for a name that is not continuous.
    pub fn build(reference: &Table, variables: &FeatureVariables) -> Result<Self> {
        if reference.num_rows() == 0 {
            return Err(WganError::EmptyTable);
        }

        let mut seen: Vec<&str> = Vec::new();
        for name in variables
            .continuous
            .iter()
            .chain(&variables.categorical)
            .chain(&variables.context)
        {
            if seen.contains(&name.as_str()) {
                return Err(WganError::DuplicateColumn(name.clone()));
            }
            seen.push(name);
        }

        for name in variables.lower_bounds.keys().chain(variables.upper_bounds.keys()) {
            if !variables.continuous.contains(name) {
                return Err(WganError::UnknownBoundVariable(name.clone()));
            }
        }

        let continuous_stats = variables
            .continuous
            .iter()
            .map(|name| reference.numeric(name).map(ColumnStats::of))
            .collect::<Result<Vec<_>>>()?;
        let context_stats = variables
            .context
            .iter()
            .map(|name| reference.numeric(name).map(ColumnStats::of))
            .collect::<Result<Vec<_>>>()?;

        let categorical = variables
            .categorical
            .iter()
            .map(|name| {
                let column = reference
                    .column(name)
                    .ok_or_else(|| WganError::MissingVariable(name.clone()))?;
                Ok(CategoricalVariable {
                    name: name.clone(),
                    levels: Levels::of(column),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let bound = |map: &BTreeMap<String, f64>, name: &String, default: f64| {
            map.get(name).copied().unwrap_or(default)
        };
        let lower_bounds = variables
            .continuous
            .iter()
            .map(|n| bound(&variables.lower_bounds, n, -UNBOUNDED))
            .collect();
        let upper_bounds = variables
            .continuous
            .iter()
            .map(|n| bound(&variables.upper_bounds, n, UNBOUNDED))
            .collect();

        let spec = Self {
            continuous: variables.continuous.clone(),
            categorical,
            context: variables.context.clone(),
            continuous_stats,
            context_stats,
            lower_bounds,
            upper_bounds,
        };

        tracing::info!(
            "Feature spec: {} continuous, {} categorical {:?}, {} context; x width {}",
            spec.continuous.len(),
            spec.categorical.len(),
            spec.cat_dims(),
            spec.context.len(),
            spec.x_width()
        );
        Ok(spec)
    }

    // ─── Shape accessors ─────────────────────────────────────────────────────

    pub fn continuous_names(&self) -> &[String] {
        &self.continuous
    }

    pub fn context_names(&self) -> &[String] {
        &self.context
    }

    pub fn categorical(&self) -> &[CategoricalVariable] {
        &self.categorical
    }

    /// Cardinality of each categorical variable, in order
    pub fn cat_dims(&self) -> Vec<usize> {
        self.categorical.iter().map(|c| c.levels.len()).collect()
    }

    pub fn continuous_width(&self) -> usize {
        self.continuous.len()
    }

    /// Width of x: continuous count plus total one-hot width
    pub fn x_width(&self) -> usize {
        self.continuous_width() + self.cat_dims().iter().sum::<usize>()
    }

    pub fn context_width(&self) -> usize {
        self.context.len()
    }

    pub fn continuous_stats(&self) -> &[ColumnStats] {
        &self.continuous_stats
    }

    pub fn context_stats(&self) -> &[ColumnStats] {
        &self.context_stats
    }

    /// Lower bounds in normalised units, for the generator's clamp
    pub fn normalized_lower_bounds(&self) -> Vec<f32> {
        self.normalized(&self.lower_bounds)
    }

    pub fn normalized_upper_bounds(&self) -> Vec<f32> {
        self.normalized(&self.upper_bounds)
    }

    fn normalized(&self, bounds: &[f64]) -> Vec<f32> {
        bounds
            .iter()
            .zip(&self.continuous_stats)
            .map(|(b, s)| s.normalize(*b) as f32)
            .collect()
    }

    // ─── Encoding ────────────────────────────────────────────────────────────

    /// Encode every row of `table`.
    /// Columns not named in this feature spec are ignored.
    pub fn encode(&self, table: &Table) -> Result<EncodedTable> {
        let rows = table.num_rows();
        let continuous = self
            .continuous
            .iter()
            .map(|n| table.numeric(n))
            .collect::<Result<Vec<_>>>()?;
        let context = self
            .context
            .iter()
            .map(|n| table.numeric(n))
            .collect::<Result<Vec<_>>>()?;
        let categorical = self
            .categorical
            .iter()
            .map(|var| {
                table
                    .column(&var.name)
                    .map(|column| (var, column))
                    .ok_or_else(|| WganError::MissingVariable(var.name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let x_width = self.x_width();
        let mut x = Vec::with_capacity(rows * x_width);
        for row in 0..rows {
            for (values, stats) in continuous.iter().zip(&self.continuous_stats) {
                x.push(stats.normalize(values[row]) as f32);
            }
            for (var, column) in &categorical {
                let hot = var.levels.index_of(column, row).ok_or_else(|| WganError::UnknownLevel {
                    variable: var.name.clone(),
                    level: column.display_value(row),
                })?;
                x.extend((0..var.levels.len()).map(|i| if i == hot { 1.0 } else { 0.0 }));
            }
        }

        let context_width = self.context_width();
        let mut ctx = Vec::with_capacity(rows * context_width);
        for row in 0..rows {
            for (values, stats) in context.iter().zip(&self.context_stats) {
                ctx.push(stats.normalize(values[row]) as f32);
            }
        }

        Ok(EncodedTable {
            x,
            context: ctx,
            rows,
            x_width,
            context_width,
        })
    }

    pub fn encode_tensors<B: Backend>(
        &self,
        table: &Table,
        device: &B::Device,
    ) -> Result<(Tensor<B, 2>, Tensor<B, 2>)> {
        Ok(self.encode(table)?.to_tensors(device))
    }

    // ─── Decoding ────────────────────────────────────────────────────────────

    /// Rebuild a table from encoded rows.
    /// Output columns: continuous, categorical, context.
    /// Continuous values are kept inside their raw-unit bounds.
    pub fn decode<R: Rng>(&self, encoded: &EncodedTable, rng: &mut R) -> Result<Table> {
        if encoded.x_width != self.x_width() {
            return Err(WganError::WidthMismatch {
                what: "x",
                expected: self.x_width(),
                found: encoded.x_width,
            });
        }
        if encoded.context_width != self.context_width() {
            return Err(WganError::WidthMismatch {
                what: "context",
                expected: self.context_width(),
                found: encoded.context_width,
            });
        }

        let rows = encoded.rows;
        let mut columns: Vec<(String, Column)> = Vec::new();

        for (j, name) in self.continuous.iter().enumerate() {
            let stats = self.continuous_stats[j];
            let (lower, upper) = (self.lower_bounds[j], self.upper_bounds[j]);
            let values = (0..rows)
                .map(|r| stats.denormalize(encoded.x_row(r)[j] as f64).clamp(lower, upper))
                .collect();
            columns.push((name.clone(), Column::Numeric(values)));
        }

        let mut offset = self.continuous_width();
        for var in &self.categorical {
            let width = var.levels.len();
            let indices = (0..rows)
                .map(|r| {
                    sample_level(&encoded.x_row(r)[offset..offset + width], rng)
                        .ok_or_else(|| WganError::InvalidProbabilities(var.name.clone()))
                })
                .collect::<Result<Vec<_>>>()?;
            columns.push((var.name.clone(), var.levels.column_from_indices(&indices)));
            offset += width;
        }

        for (j, name) in self.context.iter().enumerate() {
            let stats = self.context_stats[j];
            let values = (0..rows)
                .map(|r| stats.denormalize(encoded.context_row(r)[j] as f64))
                .collect();
            columns.push((name.clone(), Column::Numeric(values)));
        }

        Table::from_columns(columns)
    }

    pub fn decode_tensors<B: Backend, R: Rng>(
        &self,
        x: Tensor<B, 2>,
        context: Tensor<B, 2>,
        rng: &mut R,
    ) -> Result<Table> {
        self.decode(&EncodedTable::from_tensors(x, context)?, rng)
    }

    // ─── Model application ───────────────────────────────────────────────────

    /// Replace the continuous and categorical columns of `table`
    /// with generator output conditioned on its context columns.
    pub fn apply_generator<B: Backend, R: Rng>(
        &self,
        generator: &Generator<B>,
        table: &Table,
        device: &B::Device,
        rng: &mut R,
    ) -> Result<Table> {
        let (_, context) = self.encode_tensors::<B>(table, device)?;
        let x_hat = generator.forward(context.clone(), rng);
        let generated = self.decode_tensors(x_hat, context, rng)?;

        let mut output = table.clone();
        let replaced = self
            .continuous
            .iter()
            .chain(self.categorical.iter().map(|c| &c.name));
        for name in replaced {
            let column = generated
                .column(name)
                .cloned()
                .ok_or_else(|| WganError::MissingVariable(name.clone()))?;
            output.replace_column(name, column)?;
        }
        Ok(output)
    }

    /// Score every row of `table` and insert the scores as the
    /// first column, replacing any column with the same name.
    pub fn apply_critic<B: Backend, R: Rng>(
        &self,
        critic: &Critic<B>,
        table: &Table,
        column: &str,
        device: &B::Device,
        rng: &mut R,
    ) -> Result<Table> {
        let (x, context) = self.encode_tensors::<B>(table, device)?;
        let scores = to_host(critic.forward(x, context, rng))?;

        let mut output = table.clone();
        output.remove_column(column);
        output.insert_column(0, column, Column::Numeric(scores.into_iter().map(f64::from).collect()))?;
        Ok(output)
    }
}

/// Draw an index with probability proportional to the block entries.
/// None when the block has no positive mass or a negative/NaN entry.
fn sample_level<R: Rng>(block: &[f32], rng: &mut R) -> Option<usize> {
    WeightedIndex::new(block.iter().map(|&p| f64::from(p)))
        .ok()
        .map(|dist| dist.sample(rng))
}
