//! PriceTable: wide table of closing prices, one column per symbol.
//!
//! Rows are trading dates in strictly increasing order. A missing observation
//! is stored as NaN until `fill_gaps` resolves it (forward fill, then back
//! fill). The table is built fresh each cycle and never mutated by the
//! pipeline components.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::Symbol;
use crate::data::DataError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<Symbol, Vec<f64>>,
}

impl PriceTable {
    /// Build a table, validating the date index and column lengths.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: BTreeMap<Symbol, Vec<f64>>,
    ) -> Result<Self, DataError> {
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(DataError::ReshapeFailure(format!(
                "date index not strictly increasing at {} -> {}",
                pair[0], pair[1]
            )));
        }
        for (symbol, values) in &columns {
            if values.len() != dates.len() {
                return Err(DataError::ReshapeFailure(format!(
                    "column '{symbol}' has {} rows but the index has {}",
                    values.len(),
                    dates.len()
                )));
            }
        }
        Ok(Self { dates, columns })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of rows (trading dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Column names in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|s| s.as_str())
    }

    pub fn has_column(&self, symbol: &str) -> bool {
        self.columns.contains_key(symbol)
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.columns.get(symbol).map(|v| v.as_slice())
    }

    /// Whether a column holds at least one finite close.
    pub fn has_observations(&self, symbol: &str) -> bool {
        self.column(symbol)
            .is_some_and(|values| values.iter().any(|v| v.is_finite()))
    }

    /// Latest row value for a column (may be NaN if the column never traded).
    pub fn latest(&self, symbol: &str) -> Option<f64> {
        self.column(symbol).and_then(|values| values.last().copied())
    }

    /// Resolve gaps in every column: forward fill, then back fill the
    /// leading run. A column with no observations stays all-NaN.
    pub fn fill_gaps(&mut self) {
        for values in self.columns.values_mut() {
            let mut carry = f64::NAN;
            for v in values.iter_mut() {
                if v.is_finite() {
                    carry = *v;
                } else if carry.is_finite() {
                    *v = carry;
                }
            }

            if let Some(first) = values.iter().copied().find(|v| v.is_finite()) {
                for v in values.iter_mut().take_while(|v| !v.is_finite()) {
                    *v = first;
                }
            }
        }
    }

    /// Consuming variant of `fill_gaps`.
    pub fn with_filled_gaps(mut self) -> Self {
        self.fill_gaps();
        self
    }
}
