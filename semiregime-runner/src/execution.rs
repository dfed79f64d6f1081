//! Execution collaborators: the order sink and the in-memory paper broker.
//!
//! The orchestrator talks to execution only through `ExecutionSink` (what is
//! held, liquidate, set a target weight) and `Tradability`. `PaperBroker`
//! implements both in memory so cycles can be replayed and tested without a
//! brokerage.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use semiregime_core::domain::{PriceTable, Symbol, Tradability};

/// Order sink exposed by an execution venue.
pub trait ExecutionSink {
    /// Symbols with a non-zero position.
    fn invested(&self) -> Vec<Symbol>;

    /// Close the whole position in `symbol`.
    fn liquidate(&mut self, symbol: &str);

    /// Move the position in `symbol` to `fraction` of portfolio value.
    fn set_weight(&mut self, symbol: &str, fraction: f64);
}

/// One instruction received by the paper broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ExecutionEvent {
    Liquidate { symbol: Symbol, from: f64 },
    SetWeight { symbol: Symbol, from: f64, to: f64 },
}

/// In-memory broker holding target weights and last marks.
///
/// A symbol is tradable when it has a finite positive mark and is not halted.
#[derive(Debug, Clone, Default)]
pub struct PaperBroker {
    holdings: BTreeMap<Symbol, f64>,
    marks: BTreeMap<Symbol, f64>,
    halted: BTreeSet<Symbol>,
    events: Vec<ExecutionEvent>,
}

impl PaperBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed existing positions (symbol → weight).
    pub fn with_holdings<I, S>(holdings: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<Symbol>,
    {
        let mut broker = Self::new();
        for (symbol, weight) in holdings {
            if weight != 0.0 {
                broker.holdings.insert(symbol.into(), weight);
            }
        }
        broker
    }

    /// Record the last traded price for a symbol.
    ///
    /// Non-finite and non-positive prints are ignored; the previous mark
    /// stands.
    pub fn mark(&mut self, symbol: &str, price: f64) {
        if price.is_finite() && price > 0.0 {
            self.marks.insert(symbol.to_string(), price);
        }
    }

    /// Mark every column at its latest row in a snapshot.
    pub fn mark_latest(&mut self, table: &PriceTable) {
        for symbol in table.symbols() {
            if let Some(price) = table.latest(symbol) {
                self.mark(symbol, price);
            }
        }
    }

    pub fn halt(&mut self, symbol: &str) {
        self.halted.insert(symbol.to_string());
    }

    pub fn resume(&mut self, symbol: &str) {
        self.halted.remove(symbol);
    }

    pub fn holdings(&self) -> &BTreeMap<Symbol, f64> {
        &self.holdings
    }

    pub fn weight(&self, symbol: &str) -> f64 {
        self.holdings.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn events(&self) -> &[ExecutionEvent] {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<ExecutionEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Tradability for PaperBroker {
    fn is_tradable(&self, symbol: &str) -> bool {
        if self.halted.contains(symbol) {
            return false;
        }
        matches!(self.marks.get(symbol), Some(p) if p.is_finite() && *p > 0.0)
    }
}

impl ExecutionSink for PaperBroker {
    fn invested(&self) -> Vec<Symbol> {
        self.holdings
            .iter()
            .filter(|(_, w)| **w != 0.0)
            .map(|(s, _)| s.clone())
            .collect()
    }

    fn liquidate(&mut self, symbol: &str) {
        let from = self.holdings.remove(symbol).unwrap_or(0.0);
        self.events.push(ExecutionEvent::Liquidate {
            symbol: symbol.to_string(),
            from,
        });
    }

    fn set_weight(&mut self, symbol: &str, fraction: f64) {
        let from = if fraction == 0.0 {
            self.holdings.remove(symbol)
        } else {
            self.holdings.insert(symbol.to_string(), fraction)
        }
        .unwrap_or(0.0);
        self.events.push(ExecutionEvent::SetWeight {
            symbol: symbol.to_string(),
            from,
            to: fraction,
        });
    }
}
