//! Portfolio constructor: regime + scores + gross budget → signed weights.
//!
//! Scores are first restricted to tradable symbols. If fewer than
//! `2 * min_names_each_side` remain, the result is empty (go flat).
//! Otherwise the regime's policy decides how many names each active side
//! holds and how gross is split between sides:
//!
//! | Regime  | Fraction | Long share | Short share |
//! |---------|----------|------------|-------------|
//! | Bull    | 0.40     | 1.0        | 0.0         |
//! | Mixed   | 0.30     | 0.5        | 0.5         |
//! | Neutral | 0.25     | 0.5        | 0.5         |
//! | Bear    | 0.50     | 0.0        | 1.0         |
//!
//! Every name on a side gets the same weight, `side_gross / k`, clipped to
//! the per-name cap. Cap slack is not redistributed.

use crate::domain::{RegimeLabel, ScoreMap, TargetWeightMap, Tradability};

#[derive(Debug, Clone)]
pub struct PortfolioConstructor {
    min_names_each_side: usize,
    max_weight_per_name: f64,
}

impl PortfolioConstructor {
    pub fn new(min_names_each_side: usize, max_weight_per_name: f64) -> Self {
        Self {
            min_names_each_side,
            max_weight_per_name,
        }
    }

    /// Minimum number of tradable, scored names needed to hold anything.
    pub fn universe_floor(&self) -> usize {
        2 * self.min_names_each_side
    }

    pub fn max_weight_per_name(&self) -> f64 {
        self.max_weight_per_name
    }

    pub fn construct(
        &self,
        scores: &ScoreMap,
        regime: RegimeLabel,
        gross: f64,
        tradable: &dyn Tradability,
    ) -> TargetWeightMap {
        let eligible = scores.tradable_subset(tradable);
        let mut targets = TargetWeightMap::new();
        if eligible.len() < self.universe_floor() {
            return targets;
        }

        let policy = regime.policy();
        let k = policy.names_per_side(eligible.len(), self.min_names_each_side);
        if k == 0 {
            return targets;
        }
        let cap = self.max_weight_per_name;

        if policy.has_long_side() {
            let weight = (gross * policy.long_share / k as f64).max(0.0).min(cap);
            for symbol in eligible.top(k) {
                targets.insert(symbol, weight);
            }
        }

        // When scores tie across the whole universe the two sides can pick
        // the same names; the short side is written last and wins.
        if policy.has_short_side() {
            let weight = (-gross * policy.short_share / k as f64).max(-cap).min(0.0);
            for symbol in eligible.bottom(k) {
                targets.insert(symbol, weight);
            }
        }

        targets
    }
}
