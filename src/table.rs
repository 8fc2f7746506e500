// src/table.rs

use anyhow::{bail, Result};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// A year-indexed table with one nullable `f64` series per category.
///
/// Invariants: `years` is strictly ascending, every series has `years.len()`
/// cells, and column names are unique and kept sorted. Missing observations
/// are `None`, never zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WideTable {
    years: Vec<i32>,
    columns: Vec<String>,
    series: Vec<Vec<Option<f64>>>,
}

/// Forecasts share the wide layout; the index is the run of future years.
pub type ForecastTable = WideTable;

impl WideTable {
    /// Build a table from explicit years and per-column series, validating the invariants.
    pub fn new(years: Vec<i32>, columns: BTreeMap<String, Vec<Option<f64>>>) -> Result<Self> {
        if years.windows(2).any(|w| w[0] >= w[1]) {
            bail!("years must be strictly ascending: {:?}", years);
        }
        for (name, values) in &columns {
            if values.len() != years.len() {
                bail!(
                    "column {} has {} cells but the index has {} years",
                    name,
                    values.len(),
                    years.len()
                );
            }
        }
        Ok(Self::from_parts(years, columns))
    }

    /// Assemble a table from a `year → category → value` map. Categories that never
    /// appear for a year become missing cells.
    pub fn from_observations(obs: &BTreeMap<i32, BTreeMap<String, f64>>) -> Self {
        let years: Vec<i32> = obs.keys().copied().collect();
        let names: BTreeSet<&String> = obs.values().flat_map(|row| row.keys()).collect();

        let columns = names
            .into_iter()
            .map(|name| {
                let values = obs.values().map(|row| row.get(name).copied()).collect();
                (name.clone(), values)
            })
            .collect();

        Self::from_parts(years, columns)
    }

    pub(crate) fn from_parts(years: Vec<i32>, columns: BTreeMap<String, Vec<Option<f64>>>) -> Self {
        let (columns, series): (Vec<String>, Vec<Vec<Option<f64>>>) = columns.into_iter().unzip();
        Self {
            years,
            columns,
            series,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there are no years to report on.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    /// The full series for one category, aligned with `years()`.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column_position(name).map(|i| self.series[i].as_slice())
    }

    pub fn get(&self, year: i32, column: &str) -> Option<f64> {
        let row = self.row_position(year)?;
        self.column(column)?[row]
    }

    /// Cells of one year in column order, or `None` if the year is not indexed.
    pub fn row(&self, year: i32) -> Option<Vec<(&str, Option<f64>)>> {
        let row = self.row_position(year)?;
        Some(
            self.columns
                .iter()
                .zip(&self.series)
                .map(|(name, values)| (name.as_str(), values[row]))
                .collect(),
        )
    }

    /// Iterate `(column, series)` pairs.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns
            .iter()
            .zip(&self.series)
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// New table with the same index and columns, each series replaced by `f(column, series)`.
    pub fn map_series<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&str, &[Option<f64>]) -> Vec<Option<f64>>,
    {
        let series = self
            .iter_columns()
            .map(|(name, values)| {
                let out = f(name, values);
                debug_assert_eq!(out.len(), self.years.len());
                out
            })
            .collect();
        Self {
            years: self.years.clone(),
            columns: self.columns.clone(),
            series,
        }
    }

    /// Same shape as `self`, every cell missing.
    pub fn all_missing(&self) -> Self {
        self.map_series(|_, values| vec![None; values.len()])
    }

    /// The last `n` years, for console previews.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.years.len().saturating_sub(n);
        Self {
            years: self.years[start..].to_vec(),
            columns: self.columns.clone(),
            series: self.series.iter().map(|s| s[start..].to_vec()).collect(),
        }
    }

    fn row_position(&self, year: i32) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }

    fn column_position(&self, name: &str) -> Option<usize> {
        self.columns
            .binary_search_by(|c| c.as_str().cmp(name))
            .ok()
    }
}

impl fmt::Display for WideTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}", "TID")?;
        for name in &self.columns {
            write!(f, " {:>14}", name)?;
        }
        writeln!(f)?;
        for (row, year) in self.years.iter().enumerate() {
            write!(f, "{:>6}", year)?;
            for values in &self.series {
                match values[row] {
                    Some(v) => write!(f, " {:>14.2}", v)?,
                    None => write!(f, " {:>14}", "NaN")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One category's line in a [`SummaryTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub category: String,
    pub value: Option<f64>,
    /// `value - reference`
    pub delta: Option<f64>,
    /// `value / reference`
    pub ratio: Option<f64>,
}

/// Last-year comparison of every category against a reference category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    pub year: Option<i32>,
    pub reference: String,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.category == category)
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.year.map(|y| y.to_string()).unwrap_or_default();
        writeln!(
            f,
            "{:<12} {:>16} {:>16} {:>10}",
            year,
            "value",
            format!("delta_vs_{}", self.reference),
            "ratio"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<12} {:>16} {:>16} {:>10}",
                row.category,
                fmt_cell(row.value, 2),
                fmt_cell(row.delta, 2),
                fmt_cell(row.ratio, 4),
            )?;
        }
        Ok(())
    }
}

/// One category's slice of the last-year total.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRow {
    pub category: String,
    pub value: f64,
    /// Percentage of the row total, 0..=100.
    pub share_pct: f64,
}

/// Last-year composition of a table's total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShareTable {
    pub year: Option<i32>,
    pub rows: Vec<ShareRow>,
}

impl ShareTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn fmt_cell(v: Option<f64>, precision: usize) -> String {
    match v {
        Some(v) => format!("{:.*}", precision, v),
        None => "NaN".into(),
    }
}
