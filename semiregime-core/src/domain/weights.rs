//! Score maps and target weight maps.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{Symbol, Tradability};

/// Per-instrument alpha scores in basket order.
///
/// Insertion order is significant: ranking is a stable sort, so equal scores
/// keep their original relative order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(Symbol, f64)>", into = "Vec<(Symbol, f64)>")]
pub struct ScoreMap {
    entries: Vec<(Symbol, f64)>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a score. Overwriting keeps the original position.
    pub fn insert(&mut self, symbol: impl Into<Symbol>, score: f64) {
        let symbol = symbol.into();
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = score,
            None => self.entries.push((symbol, score)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, score)| *score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(s, score)| (s.as_str(), *score))
    }

    /// Scores restricted to symbols the predicate accepts, order preserved.
    pub fn tradable_subset(&self, tradable: &dyn Tradability) -> ScoreMap {
        self.entries
            .iter()
            .filter(|(s, _)| tradable.is_tradable(s))
            .cloned()
            .collect()
    }

    /// The `k` highest scores, best first. Ties keep insertion order.
    pub fn top(&self, k: usize) -> Vec<&str> {
        self.ranked(k, |a, b| b.partial_cmp(&a).unwrap_or(Ordering::Equal))
    }

    /// The `k` lowest scores, worst first. Ties keep insertion order.
    pub fn bottom(&self, k: usize) -> Vec<&str> {
        self.ranked(k, |a, b| a.partial_cmp(&b).unwrap_or(Ordering::Equal))
    }

    fn ranked(&self, k: usize, cmp: impl Fn(f64, f64) -> Ordering) -> Vec<&str> {
        let mut order: Vec<&(Symbol, f64)> = self.entries.iter().collect();
        // sort_by is stable
        order.sort_by(|a, b| cmp(a.1, b.1));
        order.into_iter().take(k).map(|(s, _)| s.as_str()).collect()
    }
}

impl FromIterator<(Symbol, f64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (Symbol, f64)>>(iter: I) -> Self {
        let mut map = ScoreMap::new();
        for (symbol, score) in iter {
            map.insert(symbol, score);
        }
        map
    }
}

impl From<Vec<(Symbol, f64)>> for ScoreMap {
    fn from(entries: Vec<(Symbol, f64)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<ScoreMap> for Vec<(Symbol, f64)> {
    fn from(map: ScoreMap) -> Self {
        map.entries
    }
}

/// Signed target weight per symbol, as a fraction of portfolio value.
///
/// Symbols absent from the map are implicitly flat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetWeightMap(BTreeMap<Symbol, f64>);

impl TargetWeightMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<Symbol>, weight: f64) {
        self.0.insert(symbol.into(), weight);
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.0.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(s, w)| (s.as_str(), *w))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|s| s.as_str())
    }

    /// Sum of positive weights.
    pub fn long_exposure(&self) -> f64 {
        self.0.values().filter(|w| **w > 0.0).sum()
    }

    /// Sum of negative weights (a non-positive number).
    pub fn short_exposure(&self) -> f64 {
        self.0.values().filter(|w| **w < 0.0).sum()
    }

    /// Sum of absolute weights.
    pub fn gross(&self) -> f64 {
        self.0.values().map(|w| w.abs()).sum()
    }

    pub fn net(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn max_abs_weight(&self) -> f64 {
        self.0.values().fold(0.0, |acc, w| acc.max(w.abs()))
    }
}
