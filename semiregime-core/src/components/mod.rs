//! Weight-pipeline components.
//!
//! The regime classifier, volatility targeter and alpha scorer are pure
//! functions of the same immutable `PriceTable` with no ordering dependency
//! between them. The portfolio constructor combines their outputs into a
//! `TargetWeightMap`.

pub mod alpha;
pub mod portfolio;
pub mod regime;
pub mod vol_target;

pub use alpha::{AlphaFactors, AlphaScorer, VOLATILITY_PENALTY};
pub use portfolio::PortfolioConstructor;
pub use regime::{RegimeClassifier, RegimeIndicators, RegimeReferences, MISSING_INPUTS_REGIME};
pub use vol_target::{GrossPresets, VolEstimate, VolatilityTargeter, NEUTRAL_SCALE};

/// Build a gap-free table from named close columns for testing.
///
/// All columns must have the same length; dates are consecutive days
/// starting 2024-01-02.
#[cfg(test)]
pub fn make_table(columns: &[(&str, Vec<f64>)]) -> crate::domain::PriceTable {
    let len = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let dates = (0..len)
        .map(|i| base_date + chrono::Duration::days(i as i64))
        .collect();
    let cols = columns
        .iter()
        .map(|(s, v)| (s.to_string(), v.clone()))
        .collect();
    crate::domain::PriceTable::new(dates, cols).unwrap()
}

/// Geometric price path from a constant daily return.
#[cfg(test)]
pub fn trend(start: f64, daily_return: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| start * (1.0 + daily_return).powi(i as i32))
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for component tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
