//! Domain types for the weight pipeline.

pub mod instrument;
pub mod price_table;
pub mod regime;
pub mod weights;

pub use instrument::{AllTradable, Tradability};
pub use price_table::PriceTable;
pub use regime::{RegimeLabel, RegimePolicy};
pub use weights::{ScoreMap, TargetWeightMap};

/// Symbol type alias
pub type Symbol = String;
