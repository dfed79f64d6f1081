//! History provider trait and structured error types.
//!
//! The `HistoryProvider` trait abstracts over where daily closes come from
//! (CSV file, in-memory store, synthetic generator, a live data vendor) so
//! the orchestrator can be driven and tested without any I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Symbol;

/// One daily close in long format, as returned by a history provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub symbol: Symbol,
    pub close: f64,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, symbol: impl Into<Symbol>, close: f64) -> Self {
        Self {
            date,
            symbol: symbol.into(),
            close,
        }
    }
}

/// History failures that abort a rebalance cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("history unavailable: {0}")]
    DataUnavailable(String),

    #[error("history reshape failed: {0}")]
    ReshapeFailure(String),
}

/// Source of daily closing prices.
pub trait HistoryProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch up to `lookback_bars` trailing daily closes, ending on or before
    /// `as_of`, for every requested symbol. An empty result is allowed and
    /// is treated by the caller as an abort condition.
    fn fetch_history(
        &self,
        symbols: &[Symbol],
        lookback_bars: usize,
        as_of: NaiveDate,
    ) -> Result<Vec<PriceRecord>, DataError>;
}
