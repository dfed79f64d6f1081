//! Tradability: the only thing the pipeline asks about an instrument.
//!
//! Whether an instrument has live data, is open for trading and carries a
//! positive price is owned by the execution side. The core only queries it.

/// Predicate answering "can this symbol be traded right now?".
pub trait Tradability {
    fn is_tradable(&self, symbol: &str) -> bool;
}

impl<F> Tradability for F
where
    F: Fn(&str) -> bool,
{
    fn is_tradable(&self, symbol: &str) -> bool {
        self(symbol)
    }
}

/// Treats every symbol as tradable. Useful for research runs with no broker.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllTradable;

impl Tradability for AllTradable {
    fn is_tradable(&self, _symbol: &str) -> bool {
        true
    }
}
