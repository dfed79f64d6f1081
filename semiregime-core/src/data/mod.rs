//! History input: the provider seam and long-to-wide reshaping.

pub mod align;
pub mod provider;

pub use align::pivot_records;
pub use provider::{DataError, HistoryProvider, PriceRecord};
