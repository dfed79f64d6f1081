//! Safe statistics: degenerate-input-safe primitives used by every component.
//!
//! Each primitive has one degenerate-input policy and never panics or
//! returns an error:
//! - `safe_zscore`: undefined, non-finite or near-zero dispersion → zeros.
//! - `safe_ratio`: non-finite quotients are dropped, not coerced to zero.
//! - `safe_rolling_compare`: fewer than `window` observations → `false`.

pub mod rolling;

pub use rolling::{pct_change, rolling_mean, rolling_std, RollingWindow};

/// Dispersion below this is treated as zero by `safe_zscore`.
pub const ZSCORE_EPSILON: f64 = 1e-12;

/// Mean of the finite entries, `None` if there are none.
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Sample standard deviation (N-1) of the finite entries, `None` below two.
pub fn finite_sample_std(values: &[f64]) -> Option<f64> {
    let mean = finite_mean(values)?;
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }
    let ss: f64 = finite.iter().map(|v| (v - mean).powi(2)).sum();
    Some((ss / (finite.len() - 1) as f64).sqrt())
}

/// Cross-sectional z-score: `(x - mean) / std` over the finite entries.
///
/// When the standard deviation is undefined, non-finite or below
/// `ZSCORE_EPSILON`, every observed entry maps to `0.0`. Entries that were
/// missing (non-finite) on input stay NaN in both branches, so an instrument
/// without a metric never acquires a score.
pub fn safe_zscore(values: &[f64]) -> Vec<f64> {
    let dispersion = finite_sample_std(values)
        .filter(|sd| sd.is_finite() && *sd >= ZSCORE_EPSILON)
        .zip(finite_mean(values));

    values
        .iter()
        .map(|&x| {
            if !x.is_finite() {
                return f64::NAN;
            }
            match dispersion {
                Some((sd, mean)) => (x - mean) / sd,
                None => 0.0,
            }
        })
        .collect()
}

/// Elementwise `a / b`, keeping only finite quotients.
///
/// The output may be shorter than the inputs; dropped observations are
/// removed rather than zeroed. Inputs are paired up to the shorter length.
pub fn safe_ratio(numerator: &[f64], denominator: &[f64]) -> Vec<f64> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(a, b)| a / b)
        .filter(|q| q.is_finite())
        .collect()
}

/// Whether the latest value exceeds its own trailing mean over `window`
/// (the window includes the latest value).
///
/// `false` when fewer than `window` observations exist, when `window` is
/// zero, or when either side of the comparison is not finite.
pub fn safe_rolling_compare(series: &[f64], window: usize) -> bool {
    if window == 0 || series.len() < window {
        return false;
    }
    let mut acc = RollingWindow::new(window);
    for &x in &series[series.len() - window..] {
        acc.push(x);
    }
    match series.last() {
        Some(&latest) => latest.is_finite() && latest > acc.mean(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zscore_normalizes() {
        let z = safe_zscore(&[1.0, 2.0, 3.0]);
        assert!((z[0] + 1.0).abs() < 1e-12);
        assert!(z[1].abs() < 1e-12);
        assert!((z[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zscore_of_constant_is_zero() {
        assert_eq!(safe_zscore(&[5.0, 5.0, 5.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn zscore_of_single_value_is_zero() {
        assert_eq!(safe_zscore(&[42.0]), vec![0.0]);
    }

    #[test]
    fn zscore_keeps_missing_entries_missing() {
        let z = safe_zscore(&[1.0, f64::NAN, 3.0]);
        assert!((z[0] + 0.7071067811865475).abs() < 1e-12);
        assert!(z[1].is_nan());
        assert!((z[2] - 0.7071067811865475).abs() < 1e-12);

        let degenerate = safe_zscore(&[2.0, f64::NAN, 2.0]);
        assert_eq!(degenerate[0], 0.0);
        assert!(degenerate[1].is_nan());
    }

    #[test]
    fn zscore_empty_input() {
        assert!(safe_zscore(&[]).is_empty());
    }

    #[test]
    fn ratio_drops_non_finite() {
        let r = safe_ratio(&[2.0, 1.0, f64::NAN, 0.0, 9.0], &[1.0, 0.0, 1.0, 0.0, 3.0]);
        assert_eq!(r, vec![2.0, 3.0]);
    }

    #[test]
    fn rolling_compare_latest_above_mean() {
        assert!(safe_rolling_compare(&[1.0, 2.0, 3.0, 4.0], 3));
        assert!(!safe_rolling_compare(&[4.0, 3.0, 2.0, 1.0], 3));
    }

    #[test]
    fn rolling_compare_equal_is_not_above() {
        assert!(!safe_rolling_compare(&[2.0, 2.0, 2.0], 3));
    }

    #[test]
    fn rolling_compare_insufficient_history() {
        assert!(!safe_rolling_compare(&[1.0, 2.0], 3));
        assert!(!safe_rolling_compare(&[], 1));
        assert!(!safe_rolling_compare(&[1.0, 2.0], 0));
    }

    #[test]
    fn rolling_compare_exactly_window_observations() {
        assert!(safe_rolling_compare(&[1.0, 2.0, 3.0], 3));
    }

    #[test]
    fn rolling_compare_nan_in_window_is_false() {
        assert!(!safe_rolling_compare(&[1.0, f64::NAN, 3.0], 3));
    }
}
