//! Regime classifier: posture score 0..3 from three moving-average tests.
//!
//! Each indicator asks whether the latest value of a series sits above its
//! own trailing mean over `ma_length` bars:
//! - trend: the sector proxy itself
//! - relative strength: sector proxy / broad-market proxy
//! - curve: long-duration rate proxy / short-duration rate proxy
//!
//! The label is the number of indicators that fire. An indicator that cannot
//! be evaluated (short history, empty ratio) counts as not firing. If any
//! reference column is missing from the table the classifier returns
//! `Neutral` without evaluating anything.

use serde::{Deserialize, Serialize};

use crate::domain::{PriceTable, RegimeLabel, Symbol};
use crate::stats::{safe_ratio, safe_rolling_compare};

/// Label used when a reference column is absent.
pub const MISSING_INPUTS_REGIME: RegimeLabel = RegimeLabel::Neutral;

/// The four reference instruments the classifier reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeReferences {
    pub sector: Symbol,
    pub market: Symbol,
    pub long_rate: Symbol,
    pub short_rate: Symbol,
}

impl RegimeReferences {
    pub fn symbols(&self) -> [&str; 4] {
        [
            self.sector.as_str(),
            self.market.as_str(),
            self.long_rate.as_str(),
            self.short_rate.as_str(),
        ]
    }
}

/// The three indicator bits behind a regime label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeIndicators {
    pub trend: bool,
    pub relative_strength: bool,
    pub curve: bool,
}

impl RegimeIndicators {
    pub fn score(&self) -> u8 {
        u8::from(self.trend) + u8::from(self.relative_strength) + u8::from(self.curve)
    }

    pub fn label(&self) -> RegimeLabel {
        RegimeLabel::from_score(self.score())
    }
}

#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    ma_length: usize,
    references: RegimeReferences,
}

impl RegimeClassifier {
    pub fn new(ma_length: usize, references: RegimeReferences) -> Self {
        Self {
            ma_length,
            references,
        }
    }

    pub fn ma_length(&self) -> usize {
        self.ma_length
    }

    pub fn references(&self) -> &RegimeReferences {
        &self.references
    }

    /// Evaluate the three indicators, or `None` if a reference is missing.
    pub fn indicators(&self, table: &PriceTable) -> Option<RegimeIndicators> {
        let refs = &self.references;
        let sector = table.column(&refs.sector)?;
        let market = table.column(&refs.market)?;
        let long_rate = table.column(&refs.long_rate)?;
        let short_rate = table.column(&refs.short_rate)?;

        Some(RegimeIndicators {
            trend: safe_rolling_compare(sector, self.ma_length),
            relative_strength: safe_rolling_compare(
                &safe_ratio(sector, market),
                self.ma_length,
            ),
            curve: safe_rolling_compare(&safe_ratio(long_rate, short_rate), self.ma_length),
        })
    }

    pub fn classify(&self, table: &PriceTable) -> RegimeLabel {
        self.indicators(table)
            .map(|ind| ind.label())
            .unwrap_or(MISSING_INPUTS_REGIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{make_table, trend};

    const MA: usize = 20;
    const LEN: usize = 40;

    fn references() -> RegimeReferences {
        RegimeReferences {
            sector: "SOXX".into(),
            market: "SPY".into(),
            long_rate: "IEF".into(),
            short_rate: "SHY".into(),
        }
    }

    fn classifier() -> RegimeClassifier {
        RegimeClassifier::new(MA, references())
    }

    fn flat(len: usize) -> Vec<f64> {
        vec![100.0; len]
    }

    #[test]
    fn all_rising_is_bull() {
        let table = make_table(&[
            ("SOXX", trend(100.0, 0.004, LEN)),
            ("SPY", flat(LEN)),
            ("IEF", trend(100.0, 0.001, LEN)),
            ("SHY", flat(LEN)),
        ]);
        let ind = classifier().indicators(&table).unwrap();
        assert!(ind.trend && ind.relative_strength && ind.curve);
        assert_eq!(classifier().classify(&table), RegimeLabel::Bull);
    }

    #[test]
    fn all_falling_is_bear() {
        let table = make_table(&[
            ("SOXX", trend(100.0, -0.004, LEN)),
            ("SPY", trend(100.0, 0.002, LEN)),
            ("IEF", trend(100.0, -0.001, LEN)),
            ("SHY", flat(LEN)),
        ]);
        assert_eq!(classifier().classify(&table), RegimeLabel::Bear);
    }

    #[test]
    fn sector_up_but_lagging_market_with_flat_curve_is_neutral() {
        let table = make_table(&[
            ("SOXX", trend(100.0, 0.002, LEN)),
            ("SPY", trend(100.0, 0.004, LEN)),
            ("IEF", flat(LEN)),
            ("SHY", flat(LEN)),
        ]);
        let ind = classifier().indicators(&table).unwrap();
        assert!(ind.trend);
        assert!(!ind.relative_strength);
        assert!(!ind.curve);
        assert_eq!(classifier().classify(&table), RegimeLabel::Neutral);
    }

    #[test]
    fn two_indicators_is_mixed() {
        let table = make_table(&[
            ("SOXX", trend(100.0, 0.004, LEN)),
            ("SPY", flat(LEN)),
            ("IEF", trend(100.0, -0.001, LEN)),
            ("SHY", flat(LEN)),
        ]);
        assert_eq!(classifier().classify(&table), RegimeLabel::Mixed);
    }

    #[test]
    fn missing_reference_is_neutral() {
        let table = make_table(&[
            ("SOXX", trend(100.0, 0.004, LEN)),
            ("SPY", flat(LEN)),
            ("IEF", trend(100.0, 0.001, LEN)),
        ]);
        assert!(classifier().indicators(&table).is_none());
        assert_eq!(classifier().classify(&table), RegimeLabel::Neutral);
    }

    #[test]
    fn short_history_contributes_nothing() {
        let table = make_table(&[
            ("SOXX", trend(100.0, 0.004, MA - 1)),
            ("SPY", flat(MA - 1)),
            ("IEF", trend(100.0, 0.001, MA - 1)),
            ("SHY", flat(MA - 1)),
        ]);
        assert_eq!(classifier().classify(&table), RegimeLabel::Bear);
    }

    #[test]
    fn undefined_ratios_are_dropped_not_zeroed() {
        // Two zero denominators leave LEN - 2 finite ratio observations.
        let mut shy = flat(LEN);
        shy[3] = 0.0;
        shy[7] = 0.0;
        let table = make_table(&[
            ("SOXX", trend(100.0, 0.004, LEN)),
            ("SPY", flat(LEN)),
            ("IEF", trend(100.0, 0.001, LEN)),
            ("SHY", shy),
        ]);
        let ind = classifier().indicators(&table).unwrap();
        assert!(ind.curve);
    }

    #[test]
    fn all_nan_ratio_does_not_fire() {
        let table = make_table(&[
            ("SOXX", trend(100.0, 0.004, LEN)),
            ("SPY", vec![f64::NAN; LEN]),
            ("IEF", trend(100.0, 0.001, LEN)),
            ("SHY", flat(LEN)),
        ]);
        let ind = classifier().indicators(&table).unwrap();
        assert!(!ind.relative_strength);
        assert_eq!(ind.label(), RegimeLabel::Mixed);
    }
}
