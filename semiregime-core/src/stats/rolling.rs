//! Fixed-window sliding accumulators.
//!
//! `RollingWindow` keeps mean and sample variance incrementally (Welford
//! add/remove). A non-finite value inside the window poisons the window's
//! result until it slides out, so every window statistic needs a full window
//! of finite observations.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    poisoned: usize,
    count: usize,
    mean: f64,
    m2: f64,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "rolling window capacity must be >= 1");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            poisoned: 0,
            count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a value, evicting the oldest once the window is full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            if let Some(evicted) = self.values.pop_front() {
                self.remove(evicted);
            }
        }
        self.values.push_back(value);
        if value.is_finite() {
            self.add(value);
        } else {
            self.poisoned += 1;
        }
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    fn is_valid(&self) -> bool {
        self.is_full() && self.poisoned == 0
    }

    /// Window mean, or NaN if the window is not full of finite values.
    pub fn mean(&self) -> f64 {
        if self.is_valid() {
            self.mean
        } else {
            f64::NAN
        }
    }

    /// Window sample standard deviation (divide by N-1), NaN when undefined.
    pub fn sample_std(&self) -> f64 {
        if self.is_valid() && self.count >= 2 {
            (self.m2 / (self.count - 1) as f64).sqrt()
        } else {
            f64::NAN
        }
    }

    fn add(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn remove(&mut self, x: f64) {
        if !x.is_finite() {
            self.poisoned -= 1;
            return;
        }
        if self.count <= 1 {
            self.count = 0;
            self.mean = 0.0;
            self.m2 = 0.0;
            return;
        }
        let remaining = (self.count - 1) as f64;
        let new_mean = self.mean - (x - self.mean) / remaining;
        self.m2 -= (x - self.mean) * (x - new_mean);
        self.mean = new_mean;
        self.count -= 1;
        if self.m2 < 0.0 {
            self.m2 = 0.0;
        }
    }
}

/// Rolling mean over `window`, NaN until a full finite window is available.
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    let mut acc = RollingWindow::new(window);
    series
        .iter()
        .map(|&x| {
            acc.push(x);
            acc.mean()
        })
        .collect()
}

/// Rolling sample standard deviation over `window`.
pub fn rolling_std(series: &[f64], window: usize) -> Vec<f64> {
    let mut acc = RollingWindow::new(window);
    series
        .iter()
        .map(|&x| {
            acc.push(x);
            acc.sample_std()
        })
        .collect()
}

/// Simple percent change over `periods` bars: `x[t] / x[t - periods] - 1`.
///
/// The first `periods` entries are NaN. A zero base yields a non-finite
/// value, which downstream consumers treat as missing.
pub fn pct_change(series: &[f64], periods: usize) -> Vec<f64> {
    (0..series.len())
        .map(|i| {
            if i < periods {
                return f64::NAN;
            }
            let prev = series[i - periods];
            let curr = series[i];
            if prev.is_nan() || curr.is_nan() {
                f64::NAN
            } else {
                curr / prev - 1.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-10,
            "actual={actual}, expected={expected}"
        );
    }

    fn naive_sample_std(window: &[f64]) -> f64 {
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let ss: f64 = window.iter().map(|x| (x - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    }

    #[test]
    fn rolling_mean_basic() {
        let result = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);
        for v in &result[..4] {
            assert!(v.is_nan());
        }
        assert_approx(result[4], 12.0);
        assert_approx(result[5], 13.0);
        assert_approx(result[6], 14.0);
    }

    #[test]
    fn rolling_std_matches_two_pass() {
        let series = [100.0, 101.5, 99.0, 103.2, 104.8, 102.1, 98.7, 105.5, 107.0];
        let result = rolling_std(&series, 4);
        for i in 3..series.len() {
            assert_approx(result[i], naive_sample_std(&series[i - 3..=i]));
        }
    }

    #[test]
    fn constant_series_has_exactly_zero_std() {
        let result = rolling_std(&[0.0; 30], 20);
        assert_eq!(result[29], 0.0);
    }

    #[test]
    fn nan_poisons_until_it_slides_out() {
        let result = rolling_mean(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0], 3);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0);
    }

    #[test]
    fn std_of_single_value_window_is_undefined() {
        let result = rolling_std(&[1.0, 2.0], 1);
        assert!(result[1].is_nan());
    }

    #[test]
    fn too_few_values() {
        let result = rolling_mean(&[1.0, 2.0], 5);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn pct_change_periods() {
        let result = pct_change(&[100.0, 110.0, 121.0], 1);
        assert!(result[0].is_nan());
        assert_approx(result[1], 0.1);
        assert_approx(result[2], 0.1);

        let two = pct_change(&[100.0, 110.0, 121.0], 2);
        assert_approx(two[2], 0.21);
    }

    #[test]
    fn pct_change_from_zero_is_not_finite() {
        let result = pct_change(&[0.0, 5.0], 1);
        assert!(!result[1].is_finite());
    }
}
