//! Semiregime Core: the weight-computation pipeline.
//!
//! This crate turns one immutable window of closing prices into a signed
//! target weight map:
//! - Domain types (price table, regime label, score map, target weights)
//! - Safe statistics and fixed-window rolling accumulators
//! - Regime classification (trend, relative strength, curve)
//! - Volatility targeting of gross exposure
//! - Cross-sectional risk-adjusted momentum scoring
//! - Regime-driven portfolio construction under a per-name cap
//!
//! Nothing here performs I/O. History retrieval, scheduling and execution
//! are collaborators injected by the runner.

pub mod components;
pub mod data;
pub mod domain;
pub mod stats;
