// ============================================================
// Layer 4 - Real vs Synthetic Comparison
// ============================================================
// Descriptive statistics that show how close a synthetic table
// is to the real one:
//   - mean and std of every shared numeric column, per group
//     and per source ("real" / "fake")
//   - the largest absolute difference between the two Pearson
//     correlation matrices
//
// Grouping columns are compared by their displayed value, so
// numeric and text group keys both work.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::error::{Result, WganError};
use crate::domain::table::{Column, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    Real,
    Fake,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Real => write!(f, "real"),
            Source::Fake => write!(f, "fake"),
        }
    }
}

/// Statistics of one (group, source) cell
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// Group key, one value per grouping column (empty when ungrouped)
    pub group: Vec<String>,
    pub source: Source,
    pub rows: usize,
    /// One entry per compared column; None when the cell is empty
    pub means: Vec<Option<f64>>,
    /// Sample std; None with fewer than two rows
    pub stds: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub group_by: Vec<String>,
    /// Numeric columns present in both tables, in real-table order
    pub columns: Vec<String>,
    pub groups: Vec<GroupSummary>,
    /// max |corr_real(i, j) - corr_fake(i, j)| over column pairs
    pub max_correlation_difference: f64,
}

impl ComparisonReport {
    pub fn summary(&self, group: &[String], source: Source) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.group == group && g.source == source)
    }
}

/// Compare `real` with `fake`, optionally split by `group_by` columns.
///
/// # Errors
/// `MissingVariable` when a grouping column is absent from either table.
pub fn compare_tables(real: &Table, fake: &Table, group_by: &[String]) -> Result<ComparisonReport> {
    for name in group_by {
        for table in [real, fake] {
            if table.column(name).is_none() {
                return Err(WganError::MissingVariable(name.clone()));
            }
        }
    }

    let columns: Vec<String> = real
        .iter()
        .filter(|(name, column)| {
            matches!(column, Column::Numeric(_))
                && matches!(fake.column(name), Some(Column::Numeric(_)))
                && !group_by.iter().any(|g| g == name)
                && *name != "source"
        })
        .map(|(name, _)| name.to_string())
        .collect();

    let real_keys = group_keys(real, group_by);
    let fake_keys = group_keys(fake, group_by);
    let distinct: BTreeSet<&Vec<String>> = real_keys.iter().chain(&fake_keys).collect();

    let mut groups = Vec::new();
    for key in distinct {
        for (source, table, keys) in [(Source::Real, real, &real_keys), (Source::Fake, fake, &fake_keys)] {
            let rows: Vec<usize> = keys
                .iter()
                .enumerate()
                .filter(|(_, k)| *k == key)
                .map(|(i, _)| i)
                .collect();
            let mut means = Vec::with_capacity(columns.len());
            let mut stds = Vec::with_capacity(columns.len());
            for name in &columns {
                let values = table.numeric(name)?;
                let selected: Vec<f64> = rows.iter().map(|&r| values[r]).collect();
                means.push(mean(&selected));
                stds.push(sample_std(&selected));
            }
            groups.push(GroupSummary {
                group: key.clone(),
                source,
                rows: rows.len(),
                means,
                stds,
            });
        }
    }

    let real_corr = correlations(real, &columns)?;
    let fake_corr = correlations(fake, &columns)?;
    let max_correlation_difference = real_corr
        .iter()
        .zip(&fake_corr)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);

    Ok(ComparisonReport {
        group_by: group_by.to_vec(),
        columns,
        groups,
        max_correlation_difference,
    })
}

fn group_keys(table: &Table, group_by: &[String]) -> Vec<Vec<String>> {
    let columns: Vec<&Column> = group_by.iter().filter_map(|g| table.column(g)).collect();
    (0..table.num_rows())
        .map(|r| columns.iter().map(|c| c.display_value(r)).collect())
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Upper-triangle Pearson correlations; undefined pairs count as 0
fn correlations(table: &Table, columns: &[String]) -> Result<Vec<f64>> {
    let data = columns
        .iter()
        .map(|c| table.numeric(c))
        .collect::<Result<Vec<_>>>()?;
    let mut out = Vec::new();
    for i in 0..data.len() {
        for j in (i + 1)..data.len() {
            out.push(pearson(data[i], data[j]).unwrap_or(0.0));
        }
    }
    Ok(out)
}

fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let (ma, mb) = (mean(a)?, mean(b)?);
    let cov: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    let va: f64 = a.iter().map(|x| (x - ma).powi(2)).sum();
    let vb: f64 = b.iter().map(|y| (y - mb).powi(2)).sum();
    let denom = (va * vb).sqrt();
    (denom > 0.0).then(|| cov / denom)
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "-".into());
        let header: Vec<String> = self
            .groups
            .iter()
            .map(|g| {
                let mut parts = g.group.clone();
                parts.push(g.source.to_string());
                parts.join("/")
            })
            .collect();

        for (title, pick) in [("means", 0usize), ("stds", 1)] {
            writeln!(f, "------------- comparison of {title} -------------")?;
            write!(f, "{:<16}", "")?;
            for h in &header {
                write!(f, "{h:>14}")?;
            }
            writeln!(f)?;
            for (c, name) in self.columns.iter().enumerate() {
                write!(f, "{name:<16}")?;
                for g in &self.groups {
                    let value = if pick == 0 { g.means[c] } else { g.stds[c] };
                    write!(f, "{:>14}", cell(value))?;
                }
                writeln!(f)?;
            }
        }
        writeln!(
            f,
            "max |correlation difference|: {:.4}",
            self.max_correlation_difference
        )
    }
}
