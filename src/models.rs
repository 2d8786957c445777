use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::dates::DateRange;
use crate::error::{PriceError, Result};

/// One named numeric column of a [`PriceFrame`]. Missing observations are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Date-indexed table of closing prices, one column per symbol.
///
/// The index is kept in chronological order. Derived indicator columns are
/// appended next to the price columns and share the same index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceFrame {
    index: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl PriceFrame {
    /// Build a single-column frame from `(date, price)` observations.
    pub fn from_series(name: &str, observations: Vec<(NaiveDate, f64)>) -> Self {
        Self::from_observations(vec![(name.to_string(), observations)])
    }

    /// Build a wide frame from per-column observations.
    ///
    /// The index is the sorted union of every column's dates; cells with no
    /// observation are NaN. Columns keep the order they were given in.
    pub fn from_observations(series: Vec<(String, Vec<(NaiveDate, f64)>)>) -> Self {
        let mut dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, obs)| obs.iter().map(|(d, _)| *d))
            .collect();
        dates.sort();
        dates.dedup();

        let positions: BTreeMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let columns = series
            .into_iter()
            .map(|(name, obs)| {
                let mut values = vec![f64::NAN; dates.len()];
                for (date, value) in obs {
                    values[positions[&date]] = value;
                }
                Column { name, values }
            })
            .collect();

        Self {
            index: dates,
            columns,
        }
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`column`](Self::column) but a missing column is a lookup failure
    /// naming the symbol.
    pub fn require(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| PriceError::symbol_not_found(name, "price frame"))
    }

    /// Append a column, or replace the values of an existing one.
    pub fn insert(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.index.len() {
            return Err(PriceError::LengthMismatch {
                column: name.to_string(),
                expected: self.index.len(),
                actual: values.len(),
            });
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }

    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.name == from) {
            column.name = to.to_string();
        }
    }

    /// New frame holding only `names`, in the order given.
    pub fn select(&self, names: &[&str]) -> Result<PriceFrame> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(Column {
                name: name.to_string(),
                values: self.require(name)?.to_vec(),
            });
        }
        Ok(PriceFrame {
            index: self.index.clone(),
            columns,
        })
    }

    /// Rows whose date falls inside the range's explicit bounds (inclusive).
    /// An open bound does not filter.
    pub fn filter_dates(&self, range: &DateRange) -> PriceFrame {
        let keep: Vec<usize> = self
            .index
            .iter()
            .enumerate()
            .filter(|(_, d)| range.contains(**d))
            .map(|(i, _)| i)
            .collect();

        PriceFrame {
            index: keep.iter().map(|&i| self.index[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: keep.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
        }
    }

    /// Apply `f` to every column, keeping names and index.
    pub fn map_columns<F>(&self, f: F) -> PriceFrame
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        PriceFrame {
            index: self.index.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: f(&c.values),
                })
                .collect(),
        }
    }
}
