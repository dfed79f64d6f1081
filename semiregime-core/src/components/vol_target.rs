//! Volatility targeter: gross-exposure scale from realized volatility.
//!
//! Realized volatility is the sample standard deviation of daily simple
//! returns over a trailing window, annualized with sqrt(252). The scale is
//! `target / max(annualized, floor)`, clipped to `[min_gross, max_gross]`.
//! An undefined or near-zero realized volatility short-circuits to the
//! neutral scale 1.0 without clipping.

use serde::{Deserialize, Serialize};

use crate::domain::RegimeLabel;
use crate::stats::{pct_change, rolling_std};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Daily volatility below this is treated as degenerate.
pub const DEGENERATE_VOL_EPSILON: f64 = 1e-8;
/// Lower bound on annualized volatility in the scale denominator.
pub const ANNUAL_VOL_FLOOR: f64 = 1e-3;
pub const NEUTRAL_SCALE: f64 = 1.0;

/// Outcome of a realized-volatility estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolEstimate {
    /// Window too short, non-finite, or effectively zero.
    Degenerate,
    Realized {
        daily: f64,
        annualized: f64,
        /// `target / max(annualized, floor)` before clipping.
        raw_scale: f64,
    },
}

/// Base gross exposure per regime, before volatility scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrossPresets {
    pub bull: f64,
    pub mixed: f64,
    pub neutral: f64,
    pub bear: f64,
}

impl Default for GrossPresets {
    fn default() -> Self {
        Self {
            bull: 1.10,
            mixed: 1.00,
            neutral: 0.80,
            bear: 0.90,
        }
    }
}

impl GrossPresets {
    pub fn for_regime(&self, regime: RegimeLabel) -> f64 {
        match regime {
            RegimeLabel::Bull => self.bull,
            RegimeLabel::Mixed => self.mixed,
            RegimeLabel::Neutral => self.neutral,
            RegimeLabel::Bear => self.bear,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VolatilityTargeter {
    window: usize,
    target_annual_vol: f64,
    min_gross: f64,
    max_gross: f64,
}

impl VolatilityTargeter {
    pub fn new(window: usize, target_annual_vol: f64, min_gross: f64, max_gross: f64) -> Self {
        assert!(window >= 1, "volatility window must be >= 1");
        Self {
            window,
            target_annual_vol,
            min_gross,
            max_gross,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Estimate realized volatility from a close-price series.
    pub fn estimate(&self, closes: &[f64]) -> VolEstimate {
        let returns = pct_change(closes, 1);
        let daily = rolling_std(&returns, self.window)
            .last()
            .copied()
            .unwrap_or(f64::NAN);

        if !daily.is_finite() || daily < DEGENERATE_VOL_EPSILON {
            return VolEstimate::Degenerate;
        }

        let annualized = daily * TRADING_DAYS_PER_YEAR.sqrt();
        VolEstimate::Realized {
            daily,
            annualized,
            raw_scale: self.target_annual_vol / annualized.max(ANNUAL_VOL_FLOOR),
        }
    }

    /// Multiplier applied to the regime's base gross.
    pub fn scale(&self, closes: &[f64]) -> f64 {
        match self.estimate(closes) {
            VolEstimate::Degenerate => NEUTRAL_SCALE,
            VolEstimate::Realized { raw_scale, .. } => self.clip(raw_scale),
        }
    }

    /// `base_gross * scale`, clipped to `[min_gross, max_gross]`.
    pub fn gross_budget(&self, base_gross: f64, scale: f64) -> f64 {
        self.clip(base_gross * scale)
    }

    fn clip(&self, x: f64) -> f64 {
        x.max(self.min_gross).min(self.max_gross)
    }
}
