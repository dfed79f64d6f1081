//! Semiregime Runner: configuration, rebalance orchestration, replay.
//!
//! This crate builds on `semiregime-core` to provide:
//! - TOML strategy configuration with a content hash
//! - The rebalance orchestrator and its once-per-date guard
//! - Execution seam plus an in-memory paper broker
//! - History loading from CSV or a synthetic generator
//! - Cadence-driven historical replay and artifact export

pub mod config;
pub mod data_loader;
pub mod execution;
pub mod export;
pub mod orchestrator;
pub mod replay;
pub mod schedule;

pub use config::{ConfigError, StrategyConfig};
pub use data_loader::{generate_synthetic_history, load_price_csv, HistoryStore, LoadError};
pub use execution::{ExecutionEvent, ExecutionSink, PaperBroker};
pub use orchestrator::{
    CycleDiagnostics, CycleOutcome, CyclePlan, RebalanceGuard, RebalanceOrchestrator,
    RebalanceReport,
};
pub use replay::{replay, AbortedCycle, ReplaySummary};
pub use schedule::RebalanceCadence;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn public_types_are_send_sync() {
        assert_send_sync::<StrategyConfig>();
        assert_send_sync::<RebalanceOrchestrator>();
        assert_send_sync::<RebalanceGuard>();
        assert_send_sync::<HistoryStore>();
        assert_send_sync::<PaperBroker>();
        assert_send_sync::<ReplaySummary>();
    }
}
