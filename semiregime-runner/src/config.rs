//! Strategy configuration: TOML-backed, validated, content-addressed.
//!
//! Every field has a default, so an empty TOML document yields the reference
//! semiconductor setup. `config_id()` hashes the canonical JSON form with
//! BLAKE3 so cycle reports can be tied back to the exact parameters.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use semiregime_core::components::{
    AlphaScorer, GrossPresets, PortfolioConstructor, RegimeClassifier, RegimeReferences,
    VolatilityTargeter,
};
use semiregime_core::domain::Symbol;

use crate::schedule::RebalanceCadence;

/// Extra bars fetched beyond the longest lookback.
pub const LOOKBACK_PADDING: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete parameter set for the rebalancing strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub universe: UniverseConfig,
    pub signals: SignalConfig,
    pub exposure: ExposureConfig,
    pub portfolio: PortfolioConfig,
    pub schedule: ScheduleConfig,
}

/// Reference proxies and the tradable basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Broad sector proxy; also the volatility-targeting reference.
    pub sector_proxy: Symbol,
    pub market_proxy: Symbol,
    pub long_rate_proxy: Symbol,
    pub short_rate_proxy: Symbol,
    /// Override for the volatility-targeting reference (defaults to the
    /// sector proxy).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol_reference: Option<Symbol>,
    pub basket: Vec<Symbol>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            sector_proxy: "SOXX".into(),
            market_proxy: "SPY".into(),
            long_rate_proxy: "IEF".into(),
            short_rate_proxy: "SHY".into(),
            vol_reference: None,
            basket: [
                "NVDA", "AMD", "AVGO", "QCOM", "TXN", "INTC", "MU", "ADI", "ON", "MCHP", "NXPI",
                "MRVL", "KLAC", "LRCX", "AMAT", "TER",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub momentum_lookback: usize,
    pub vol_score_window: usize,
    pub vol_target_window: usize,
    pub regime_ma: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            momentum_lookback: 126,
            vol_score_window: 60,
            vol_target_window: 20,
            regime_ma: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    pub target_annual_vol: f64,
    pub min_gross: f64,
    pub max_gross: f64,
    pub presets: GrossPresets,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            target_annual_vol: 0.10,
            min_gross: 0.20,
            max_gross: 1.30,
            presets: GrossPresets::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub min_names_each_side: usize,
    pub max_weight_per_name: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            min_names_each_side: 4,
            max_weight_per_name: 0.12,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub cadence: RebalanceCadence,
}

impl StrategyConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: StrategyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.signals;
        for (name, value) in [
            ("momentum_lookback", s.momentum_lookback),
            ("vol_score_window", s.vol_score_window),
            ("vol_target_window", s.vol_target_window),
            ("regime_ma", s.regime_ma),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("signals.{name} must be >= 1")));
            }
        }

        let e = &self.exposure;
        if !(e.target_annual_vol.is_finite() && e.target_annual_vol > 0.0) {
            return Err(ConfigError::Invalid(
                "exposure.target_annual_vol must be positive".into(),
            ));
        }
        if !(e.min_gross.is_finite() && e.max_gross.is_finite())
            || e.min_gross < 0.0
            || e.min_gross > e.max_gross
        {
            return Err(ConfigError::Invalid(format!(
                "exposure gross bounds must satisfy 0 <= min_gross <= max_gross (got {} and {})",
                e.min_gross, e.max_gross
            )));
        }
        let p = &e.presets;
        if [p.bull, p.mixed, p.neutral, p.bear]
            .iter()
            .any(|g| !g.is_finite() || *g < 0.0)
        {
            return Err(ConfigError::Invalid(
                "exposure.presets must be non-negative".into(),
            ));
        }

        let pf = &self.portfolio;
        if pf.min_names_each_side == 0 {
            return Err(ConfigError::Invalid(
                "portfolio.min_names_each_side must be >= 1".into(),
            ));
        }
        if !(pf.max_weight_per_name > 0.0 && pf.max_weight_per_name <= 1.0) {
            return Err(ConfigError::Invalid(
                "portfolio.max_weight_per_name must be in (0, 1]".into(),
            ));
        }

        let u = &self.universe;
        if u.basket.is_empty() {
            return Err(ConfigError::Invalid("universe.basket is empty".into()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = u.basket.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(ConfigError::Invalid(format!(
                "universe.basket lists '{dup}' more than once"
            )));
        }

        Ok(())
    }

    /// Deterministic BLAKE3 hash of this configuration.
    pub fn config_id(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_vec(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }

    /// Bars of history requested per cycle (also the warmup length).
    pub fn lookback_bars(&self) -> usize {
        let s = &self.signals;
        s.regime_ma
            .max(s.momentum_lookback)
            .max(s.vol_score_window)
            .max(s.vol_target_window)
            + LOOKBACK_PADDING
    }

    pub fn regime_references(&self) -> RegimeReferences {
        RegimeReferences {
            sector: self.universe.sector_proxy.clone(),
            market: self.universe.market_proxy.clone(),
            long_rate: self.universe.long_rate_proxy.clone(),
            short_rate: self.universe.short_rate_proxy.clone(),
        }
    }

    pub fn vol_reference(&self) -> &str {
        self.universe
            .vol_reference
            .as_deref()
            .unwrap_or(&self.universe.sector_proxy)
    }

    /// Basket plus reference symbols, deduplicated, basket first.
    pub fn history_symbols(&self) -> Vec<Symbol> {
        let u = &self.universe;
        let mut symbols: Vec<Symbol> = Vec::with_capacity(u.basket.len() + 5);
        let refs = [
            u.sector_proxy.as_str(),
            u.market_proxy.as_str(),
            u.long_rate_proxy.as_str(),
            u.short_rate_proxy.as_str(),
            self.vol_reference(),
        ];
        for symbol in u.basket.iter().map(|s| s.as_str()).chain(refs) {
            if !symbols.iter().any(|s| s == symbol) {
                symbols.push(symbol.to_string());
            }
        }
        symbols
    }

    pub fn regime_classifier(&self) -> RegimeClassifier {
        RegimeClassifier::new(self.signals.regime_ma, self.regime_references())
    }

    pub fn volatility_targeter(&self) -> VolatilityTargeter {
        VolatilityTargeter::new(
            self.signals.vol_target_window,
            self.exposure.target_annual_vol,
            self.exposure.min_gross,
            self.exposure.max_gross,
        )
    }

    pub fn alpha_scorer(&self) -> AlphaScorer {
        AlphaScorer::new(self.signals.momentum_lookback, self.signals.vol_score_window)
    }

    pub fn portfolio_constructor(&self) -> PortfolioConstructor {
        PortfolioConstructor::new(
            self.portfolio.min_names_each_side,
            self.portfolio.max_weight_per_name,
        )
    }
}
