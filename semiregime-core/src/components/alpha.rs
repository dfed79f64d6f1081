//! Alpha scorer: cross-sectional risk-adjusted momentum.
//!
//! Per instrument, at the latest bar:
//! - momentum: percent change over `momentum_lookback` bars
//! - volatility: sample std of daily returns over `vol_window` bars
//!
//! Both vectors are z-scored across the basket and combined as
//! `score = z(momentum) - 0.5 * z(volatility)`. Instruments whose score is
//! not finite are dropped from the result.

use crate::domain::{PriceTable, ScoreMap, Symbol};
use crate::stats::{pct_change, rolling_std, safe_zscore};

/// Weight of the volatility z-score in the composite.
pub const VOLATILITY_PENALTY: f64 = 0.5;

/// Raw factor values for one instrument (NaN where history is short).
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaFactors {
    pub symbol: Symbol,
    pub momentum: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone)]
pub struct AlphaScorer {
    momentum_lookback: usize,
    vol_window: usize,
}

impl AlphaScorer {
    pub fn new(momentum_lookback: usize, vol_window: usize) -> Self {
        assert!(momentum_lookback >= 1, "momentum lookback must be >= 1");
        assert!(vol_window >= 1, "volatility window must be >= 1");
        Self {
            momentum_lookback,
            vol_window,
        }
    }

    /// Factor values for every basket symbol present in the table, in basket
    /// order.
    pub fn factors(&self, table: &PriceTable, basket: &[Symbol]) -> Vec<AlphaFactors> {
        basket
            .iter()
            .filter_map(|symbol| {
                let closes = table.column(symbol)?;
                let momentum = pct_change(closes, self.momentum_lookback)
                    .last()
                    .copied()
                    .unwrap_or(f64::NAN);
                let returns = pct_change(closes, 1);
                let volatility = rolling_std(&returns, self.vol_window)
                    .last()
                    .copied()
                    .unwrap_or(f64::NAN);
                Some(AlphaFactors {
                    symbol: symbol.clone(),
                    momentum,
                    volatility,
                })
            })
            .collect()
    }

    /// Composite scores, finite only, in basket order.
    pub fn score(&self, table: &PriceTable, basket: &[Symbol]) -> ScoreMap {
        let factors = self.factors(table, basket);
        let momentum: Vec<f64> = factors.iter().map(|f| f.momentum).collect();
        let volatility: Vec<f64> = factors.iter().map(|f| f.volatility).collect();

        let momentum_z = safe_zscore(&momentum);
        let volatility_z = safe_zscore(&volatility);

        factors
            .into_iter()
            .zip(momentum_z.into_iter().zip(volatility_z))
            .map(|(f, (mz, vz))| (f.symbol, mz - VOLATILITY_PENALTY * vz))
            .filter(|(_, score)| score.is_finite())
            .collect()
    }
}
