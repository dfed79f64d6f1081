//! Historical replay: drive the orchestrator over a stored calendar.
//!
//! Each calendar date in `[start, end]` marks the paper broker with that
//! day's closes. Dates selected by the cadence run a cycle once at least
//! `lookback_bars` dates of history exist; earlier triggers are counted as
//! warmup and skipped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use semiregime_core::domain::Symbol;

use crate::data_loader::HistoryStore;
use crate::execution::PaperBroker;
use crate::orchestrator::{CycleOutcome, RebalanceGuard, RebalanceOrchestrator, RebalanceReport};
use crate::schedule::RebalanceCadence;

/// One aborted cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbortedCycle {
    pub date: NaiveDate,
    pub reason: String,
}

/// Everything a replay produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub cadence: RebalanceCadence,
    pub config_id: String,
    pub synthetic: bool,
    pub dataset_hash: String,
    /// Trigger dates skipped because history was still warming up.
    pub warmup_skipped: usize,
    pub reports: Vec<RebalanceReport>,
    pub aborted: Vec<AbortedCycle>,
    pub final_holdings: BTreeMap<Symbol, f64>,
}

impl ReplaySummary {
    pub fn cycles_run(&self) -> usize {
        self.reports.len()
    }
}

/// Replay `[start, end]` of `store` through `orchestrator`.
pub fn replay(
    orchestrator: &RebalanceOrchestrator,
    store: &HistoryStore,
    broker: &mut PaperBroker,
    cadence: RebalanceCadence,
    start: NaiveDate,
    end: NaiveDate,
) -> ReplaySummary {
    let calendar = store.dates();
    let warmup = orchestrator.config().lookback_bars();
    let mut guard = RebalanceGuard::new();
    let mut summary = ReplaySummary {
        start,
        end,
        cadence,
        config_id: orchestrator.config_id().to_string(),
        synthetic: store.is_synthetic(),
        dataset_hash: store.dataset_hash(),
        warmup_skipped: 0,
        reports: Vec::new(),
        aborted: Vec::new(),
        final_holdings: BTreeMap::new(),
    };

    let mut previous: Option<NaiveDate> = None;
    for (i, &date) in calendar.iter().enumerate() {
        let prev = previous.replace(date);
        if date < start || date > end {
            continue;
        }
        for record in store.records_on(date) {
            broker.mark(&record.symbol, record.close);
        }
        if !cadence.is_trigger(prev, date) {
            continue;
        }
        if i + 1 < warmup {
            debug!(%date, bars = i + 1, warmup, "warming up, cycle skipped");
            summary.warmup_skipped += 1;
            continue;
        }

        let (next_guard, outcome) = orchestrator.rebalance(date, &guard, store, broker);
        guard = next_guard;
        match outcome {
            CycleOutcome::Completed(report) => summary.reports.push(report),
            CycleOutcome::Aborted { date, error } => summary.aborted.push(AbortedCycle {
                date,
                reason: error.to_string(),
            }),
            CycleOutcome::Skipped { date, .. } => {
                warn!(%date, "replay calendar revisited a processed date");
            }
        }
    }

    summary.final_holdings = broker.holdings().clone();
    info!(
        cycles = summary.reports.len(),
        aborted = summary.aborted.len(),
        warmup_skipped = summary.warmup_skipped,
        "replay complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use crate::data_loader::generate_synthetic_history;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn small_config() -> StrategyConfig {
        let mut config = StrategyConfig::default();
        config.signals.regime_ma = 20;
        config.signals.momentum_lookback = 10;
        config.signals.vol_score_window = 10;
        config.signals.vol_target_window = 10;
        config
    }

    #[test]
    fn monthly_replay_runs_one_cycle_per_month_after_warmup() {
        let config = small_config();
        let store =
            generate_synthetic_history(&config.history_symbols(), d(2024, 1, 1), d(2024, 6, 28))
                .unwrap();
        let orchestrator = RebalanceOrchestrator::new(config).unwrap();
        let mut broker = PaperBroker::new();

        let summary = replay(
            &orchestrator,
            &store,
            &mut broker,
            RebalanceCadence::Monthly,
            d(2024, 1, 1),
            d(2024, 6, 28),
        );

        // lookback 25 bars: January and February triggers are still warming up.
        assert_eq!(summary.warmup_skipped, 2);
        assert_eq!(summary.cycles_run(), 4);
        assert!(summary.aborted.is_empty());
        assert!(summary.synthetic);
        let months: Vec<u32> = summary
            .reports
            .iter()
            .map(|r| chrono::Datelike::month(&r.date))
            .collect();
        assert_eq!(months, vec![3, 4, 5, 6]);
        assert_eq!(&summary.final_holdings, broker.holdings());
    }

    #[test]
    fn replay_window_outside_calendar_runs_nothing() {
        let config = small_config();
        let store =
            generate_synthetic_history(&config.history_symbols(), d(2024, 1, 1), d(2024, 3, 29))
                .unwrap();
        let orchestrator = RebalanceOrchestrator::new(config).unwrap();
        let mut broker = PaperBroker::new();
        let summary = replay(
            &orchestrator,
            &store,
            &mut broker,
            RebalanceCadence::Daily,
            d(2025, 1, 1),
            d(2025, 2, 1),
        );
        assert_eq!(summary.cycles_run(), 0);
        assert_eq!(summary.warmup_skipped, 0);
        assert!(summary.final_holdings.is_empty());
    }
}
