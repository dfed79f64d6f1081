//! Regime label and the per-regime construction policy table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete market posture derived from the three regime indicators.
///
/// The discriminant is the indicator score (number of bullish indicators).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RegimeLabel {
    Bear = 0,
    Neutral = 1,
    Mixed = 2,
    Bull = 3,
}

/// Selection and side-split parameters for one regime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimePolicy {
    /// Fraction of the eligible universe selected on each active side.
    pub selection_fraction: f64,
    /// Share of gross allocated to the long side.
    pub long_share: f64,
    /// Share of gross allocated to the short side.
    pub short_share: f64,
}

impl RegimeLabel {
    pub const ALL: [RegimeLabel; 4] = [
        RegimeLabel::Bear,
        RegimeLabel::Neutral,
        RegimeLabel::Mixed,
        RegimeLabel::Bull,
    ];

    /// Map an indicator score to a label. Scores above 3 saturate at Bull.
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => RegimeLabel::Bear,
            1 => RegimeLabel::Neutral,
            2 => RegimeLabel::Mixed,
            _ => RegimeLabel::Bull,
        }
    }

    pub fn score(self) -> u8 {
        self as u8
    }

    pub fn policy(self) -> RegimePolicy {
        match self {
            RegimeLabel::Bull => RegimePolicy {
                selection_fraction: 0.40,
                long_share: 1.0,
                short_share: 0.0,
            },
            RegimeLabel::Mixed => RegimePolicy {
                selection_fraction: 0.30,
                long_share: 0.5,
                short_share: 0.5,
            },
            RegimeLabel::Neutral => RegimePolicy {
                selection_fraction: 0.25,
                long_share: 0.5,
                short_share: 0.5,
            },
            RegimeLabel::Bear => RegimePolicy {
                selection_fraction: 0.50,
                long_share: 0.0,
                short_share: 1.0,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegimeLabel::Bear => "bear",
            RegimeLabel::Neutral => "neutral",
            RegimeLabel::Mixed => "mixed",
            RegimeLabel::Bull => "bull",
        }
    }
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), self.score())
    }
}

impl RegimePolicy {
    /// Names selected per active side: `max(min_names, floor(fraction * n))`.
    pub fn names_per_side(&self, eligible: usize, min_names: usize) -> usize {
        let by_fraction = (self.selection_fraction * eligible as f64).floor() as usize;
        min_names.max(by_fraction)
    }

    pub fn has_long_side(&self) -> bool {
        self.long_share > 0.0
    }

    pub fn has_short_side(&self) -> bool {
        self.short_share > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_round_trips_through_label() {
        for label in RegimeLabel::ALL {
            assert_eq!(RegimeLabel::from_score(label.score()), label);
        }
        assert_eq!(RegimeLabel::from_score(7), RegimeLabel::Bull);
    }

    #[test]
    fn side_shares_sum_to_one() {
        for label in RegimeLabel::ALL {
            let p = label.policy();
            assert!((p.long_share + p.short_share - 1.0).abs() < 1e-12, "{label}");
        }
    }

    #[test]
    fn bull_is_long_only_bear_is_short_only() {
        assert!(RegimeLabel::Bull.policy().has_long_side());
        assert!(!RegimeLabel::Bull.policy().has_short_side());
        assert!(!RegimeLabel::Bear.policy().has_long_side());
        assert!(RegimeLabel::Bear.policy().has_short_side());
    }

    #[test]
    fn names_per_side_respects_minimum() {
        assert_eq!(RegimeLabel::Bull.policy().names_per_side(10, 4), 4);
        assert_eq!(RegimeLabel::Bear.policy().names_per_side(10, 4), 5);
        assert_eq!(RegimeLabel::Mixed.policy().names_per_side(16, 4), 4);
        assert_eq!(RegimeLabel::Mixed.policy().names_per_side(20, 4), 6);
        assert_eq!(RegimeLabel::Neutral.policy().names_per_side(16, 4), 4);
        assert_eq!(RegimeLabel::Neutral.policy().names_per_side(40, 4), 10);
    }

    #[test]
    fn display_and_serde() {
        assert_eq!(RegimeLabel::Mixed.to_string(), "mixed(2)");
        let json = serde_json::to_string(&RegimeLabel::Bear).unwrap();
        assert_eq!(json, "\"bear\"");
    }
}
