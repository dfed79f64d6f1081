//! Rebalance orchestrator: one cycle from history fetch to execution.
//!
//! A cycle runs at most once per date (enforced by `RebalanceGuard`):
//! 1. Fetch `lookback_bars` of trailing closes for the basket and references
//! 2. Pivot to a gap-filled `PriceTable` (any `DataError` aborts the cycle
//!    before execution is touched)
//! 3. Regime label, volatility scale, gross budget
//! 4. Alpha scores over basket columns present in the snapshot
//! 5. Target weights
//! 6. Liquidate held names outside the targets, then set each tradable
//!    target weight
//!
//! `compute_targets` exposes steps 3-5 as a pure function of a snapshot so
//! the target map can be checked without a provider or broker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use semiregime_core::components::{
    AlphaScorer, PortfolioConstructor, RegimeClassifier, RegimeIndicators, VolatilityTargeter,
    MISSING_INPUTS_REGIME, NEUTRAL_SCALE,
};
use semiregime_core::data::{pivot_records, DataError, HistoryProvider};
use semiregime_core::domain::{PriceTable, RegimeLabel, ScoreMap, Symbol, TargetWeightMap, Tradability};

use crate::config::{ConfigError, StrategyConfig};
use crate::execution::ExecutionSink;

/// Remembers the last date a cycle was admitted for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceGuard {
    last_processed: Option<NaiveDate>,
}

impl RebalanceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard that has already seen `date`.
    pub fn processed_through(date: NaiveDate) -> Self {
        Self {
            last_processed: Some(date),
        }
    }

    pub fn last_processed(&self) -> Option<NaiveDate> {
        self.last_processed
    }

    /// Admit `today` if it is strictly after the last processed date.
    ///
    /// Returns the updated guard, or `None` when the cycle must be skipped.
    pub fn admit(&self, today: NaiveDate) -> Option<RebalanceGuard> {
        match self.last_processed {
            Some(last) if today <= last => None,
            _ => Some(Self::processed_through(today)),
        }
    }
}

/// Per-cycle diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleDiagnostics {
    pub regime: RegimeLabel,
    /// Gross budget after volatility scaling and clipping.
    pub realized_gross: f64,
    pub selected_names: usize,
}

/// Everything derived from one price snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CyclePlan {
    pub regime: RegimeLabel,
    /// `None` when a regime reference column was missing.
    pub indicators: Option<RegimeIndicators>,
    pub vol_scale: f64,
    pub base_gross: f64,
    pub gross: f64,
    pub scores: ScoreMap,
    pub targets: TargetWeightMap,
}

impl CyclePlan {
    pub fn diagnostics(&self) -> CycleDiagnostics {
        CycleDiagnostics {
            regime: self.regime,
            realized_gross: self.gross,
            selected_names: self.targets.len(),
        }
    }
}

/// Result of a completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceReport {
    pub date: NaiveDate,
    pub config_id: String,
    pub diagnostics: CycleDiagnostics,
    pub vol_scale: f64,
    pub targets: TargetWeightMap,
    /// Held names closed because they fell out of the targets.
    pub liquidated: Vec<Symbol>,
    /// Targets not sent because the symbol was untradable at execution time.
    pub unsent: Vec<Symbol>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Date already processed; nothing happened.
    Skipped {
        date: NaiveDate,
        last_processed: NaiveDate,
    },
    /// History could not be fetched or reshaped; execution untouched.
    Aborted { date: NaiveDate, error: DataError },
    Completed(RebalanceReport),
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&RebalanceReport> {
        match self {
            CycleOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed(_))
    }
}

/// Owns the configured components and runs rebalance cycles.
#[derive(Debug, Clone)]
pub struct RebalanceOrchestrator {
    config: StrategyConfig,
    config_id: String,
    classifier: RegimeClassifier,
    targeter: VolatilityTargeter,
    scorer: AlphaScorer,
    constructor: PortfolioConstructor,
}

impl RebalanceOrchestrator {
    pub fn new(config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let config_id = config.config_id()?;
        Ok(Self {
            classifier: config.regime_classifier(),
            targeter: config.volatility_targeter(),
            scorer: config.alpha_scorer(),
            constructor: config.portfolio_constructor(),
            config,
            config_id,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// Fetch and pivot the trailing history ending at `as_of`.
    ///
    /// A snapshot in which no basket name has a single finite close is
    /// `DataUnavailable`.
    pub fn load_snapshot(
        &self,
        provider: &dyn HistoryProvider,
        as_of: NaiveDate,
    ) -> Result<PriceTable, DataError> {
        let symbols = self.config.history_symbols();
        let records =
            provider.fetch_history(&symbols, self.config.lookback_bars(), as_of)?;
        debug!(
            provider = provider.name(),
            records = records.len(),
            %as_of,
            "fetched history"
        );
        let table = pivot_records(&records)?;
        if !self
            .config
            .universe
            .basket
            .iter()
            .any(|s| table.has_observations(s))
        {
            return Err(DataError::DataUnavailable(format!(
                "no basket prices in history ending {as_of}"
            )));
        }
        Ok(table)
    }

    /// Regime, gross budget, scores, and targets for one snapshot.
    pub fn compute_targets(&self, table: &PriceTable, tradable: &dyn Tradability) -> CyclePlan {
        let indicators = self.classifier.indicators(table);
        let regime = match indicators {
            Some(ind) => ind.label(),
            None => {
                warn!(
                    references = ?self.classifier.references().symbols(),
                    "regime reference missing from snapshot, using {MISSING_INPUTS_REGIME}"
                );
                MISSING_INPUTS_REGIME
            }
        };

        let vol_reference = self.config.vol_reference();
        let vol_scale = match table.column(vol_reference) {
            Some(closes) => self.targeter.scale(closes),
            None => {
                warn!(symbol = vol_reference, "volatility reference missing, scale left at 1.0");
                NEUTRAL_SCALE
            }
        };

        let base_gross = self.config.exposure.presets.for_regime(regime);
        let gross = self.targeter.gross_budget(base_gross, vol_scale);

        let basket: Vec<Symbol> = self
            .config
            .universe
            .basket
            .iter()
            .filter(|s| table.has_column(s))
            .cloned()
            .collect();
        let scores = self.scorer.score(table, &basket);
        let targets = self.constructor.construct(&scores, regime, gross, tradable);

        CyclePlan {
            regime,
            indicators,
            vol_scale,
            base_gross,
            gross,
            scores,
            targets,
        }
    }

    /// Run one cycle for `today`.
    ///
    /// The returned guard has consumed `today` whenever it was admitted, even
    /// if the cycle then aborted.
    pub fn rebalance<B>(
        &self,
        today: NaiveDate,
        guard: &RebalanceGuard,
        provider: &dyn HistoryProvider,
        broker: &mut B,
    ) -> (RebalanceGuard, CycleOutcome)
    where
        B: ExecutionSink + Tradability,
    {
        let Some(next_guard) = guard.admit(today) else {
            let last_processed = guard.last_processed().unwrap_or(today);
            debug!(%today, %last_processed, "rebalance already processed, skipping");
            return (
                *guard,
                CycleOutcome::Skipped {
                    date: today,
                    last_processed,
                },
            );
        };

        let table = match self.load_snapshot(provider, today) {
            Ok(table) => table,
            Err(error) => {
                warn!(%today, %error, "rebalance aborted");
                return (next_guard, CycleOutcome::Aborted { date: today, error });
            }
        };

        let plan = self.compute_targets(&table, &*broker);

        let liquidated: Vec<Symbol> = broker
            .invested()
            .into_iter()
            .filter(|s| !plan.targets.contains(s))
            .collect();
        for symbol in &liquidated {
            broker.liquidate(symbol);
        }

        let mut unsent = Vec::new();
        for (symbol, weight) in plan.targets.iter() {
            if broker.is_tradable(symbol) {
                broker.set_weight(symbol, weight);
            } else {
                unsent.push(symbol.to_string());
            }
        }

        let diagnostics = plan.diagnostics();
        info!(
            date = %today,
            regime = %diagnostics.regime,
            gross = diagnostics.realized_gross,
            names = diagnostics.selected_names,
            liquidated = liquidated.len(),
            "rebalance complete"
        );

        let report = RebalanceReport {
            date: today,
            config_id: self.config_id.clone(),
            diagnostics,
            vol_scale: plan.vol_scale,
            targets: plan.targets,
            liquidated,
            unsent,
        };
        (next_guard, CycleOutcome::Completed(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fresh_guard_admits_any_date() {
        let guard = RebalanceGuard::new();
        let next = guard.admit(d(2024, 3, 1)).unwrap();
        assert_eq!(next.last_processed(), Some(d(2024, 3, 1)));
    }

    #[test]
    fn guard_rejects_same_and_earlier_dates() {
        let guard = RebalanceGuard::processed_through(d(2024, 3, 1));
        assert!(guard.admit(d(2024, 3, 1)).is_none());
        assert!(guard.admit(d(2024, 2, 29)).is_none());
        assert_eq!(
            guard.admit(d(2024, 3, 4)).unwrap().last_processed(),
            Some(d(2024, 3, 4))
        );
    }

    #[test]
    fn orchestrator_rejects_invalid_config() {
        let mut config = StrategyConfig::default();
        config.universe.basket.clear();
        assert!(RebalanceOrchestrator::new(config).is_err());
    }

    #[test]
    fn orchestrator_carries_config_id() {
        let config = StrategyConfig::default();
        let expected = config.config_id().unwrap();
        let orchestrator = RebalanceOrchestrator::new(config).unwrap();
        assert_eq!(orchestrator.config_id(), expected);
    }
}
