//! Daily close loading for the runner.
//!
//! `HistoryStore` holds long-format closes indexed by date and serves them
//! through the `HistoryProvider` seam. Stores are built from:
//! 1. a CSV file with a `date,symbol,close` header (empty close = missing)
//! 2. the synthetic generator (developer-only, tagged as synthetic)
//!
//! The store never pivots or validates records; duplicates and bad closes
//! reach the orchestrator and are handled there.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use semiregime_core::data::{DataError, HistoryProvider, PriceRecord};
use semiregime_core::domain::Symbol;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open price file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed price CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid date range: {0}")]
    InvalidRange(String),

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    symbol: String,
    close: Option<f64>,
}

/// In-memory long-format close history.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    name: String,
    by_date: BTreeMap<NaiveDate, Vec<PriceRecord>>,
    synthetic: bool,
}

impl HistoryStore {
    pub fn new(name: impl Into<String>, records: impl IntoIterator<Item = PriceRecord>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<PriceRecord>> = BTreeMap::new();
        for record in records {
            by_date.entry(record.date).or_default().push(record);
        }
        Self {
            name: name.into(),
            by_date,
            synthetic: false,
        }
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Trading calendar: every date with at least one record, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.by_date.keys().copied().collect()
    }

    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.by_date
            .values()
            .flatten()
            .map(|r| r.symbol.clone())
            .collect()
    }

    /// Records stamped exactly `date`.
    pub fn records_on(&self, date: NaiveDate) -> &[PriceRecord] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// BLAKE3 over every record in date order.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for record in self.by_date.values().flatten() {
            hasher.update(record.date.to_string().as_bytes());
            hasher.update(record.symbol.as_bytes());
            hasher.update(&record.close.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl HistoryProvider for HistoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_history(
        &self,
        symbols: &[Symbol],
        lookback_bars: usize,
        as_of: NaiveDate,
    ) -> Result<Vec<PriceRecord>, DataError> {
        let wanted: HashSet<&str> = symbols.iter().map(String::as_str).collect();
        let mut window: Vec<&Vec<PriceRecord>> = self
            .by_date
            .range(..=as_of)
            .rev()
            .take(lookback_bars)
            .map(|(_, records)| records)
            .collect();
        window.reverse();

        Ok(window
            .into_iter()
            .flatten()
            .filter(|r| wanted.contains(r.symbol.as_str()))
            .cloned()
            .collect())
    }
}

/// Load a `date,symbol,close` CSV file into a store.
pub fn load_price_csv(path: &Path) -> Result<HistoryStore, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut store = read_price_csv(file)?;
    store.name = path.display().to_string();
    Ok(store)
}

/// Parse `date,symbol,close` CSV from any reader.
pub fn read_price_csv<R: Read>(reader: R) -> Result<HistoryStore, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        let row = row?;
        records.push(PriceRecord::new(
            row.date,
            row.symbol,
            row.close.unwrap_or(f64::NAN),
        ));
    }
    Ok(HistoryStore::new("csv", records))
}

/// Generate a deterministic random walk per symbol over weekdays in
/// `[start, end]`.
pub fn generate_synthetic_history(
    symbols: &[Symbol],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HistoryStore, LoadError> {
    if start > end {
        return Err(LoadError::InvalidRange(format!("{start} is after {end}")));
    }
    let records = symbols
        .iter()
        .flat_map(|symbol| synthetic_closes(symbol, start, end));
    let mut store = HistoryStore::new("synthetic", records);
    store.synthetic = true;
    Ok(store)
}

fn synthetic_closes(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceRecord> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let drift = (f64::from(seed[0]) / 255.0 - 0.5) * 0.002;
    let mut rng = StdRng::from_seed(seed);

    let mut records = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = drift + rng.gen_range(-0.02..0.02);
        price *= 1.0 + daily_return;
        records.push(PriceRecord::new(current, symbol, price));
        current += chrono::Duration::days(1);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn symbols(list: &[&str]) -> Vec<Symbol> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const SAMPLE: &str = "\
date,symbol,close
2024-01-02,NVDA,48.1
2024-01-02,SOXX,560.0
2024-01-03,NVDA,47.5
2024-01-03,SOXX,
2024-01-04,NVDA,48.0
2024-01-04,SOXX,555.5
";

    #[test]
    fn csv_rows_become_records() {
        let store = read_price_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(store.len(), 6);
        assert_eq!(store.dates(), vec![d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);
        assert_eq!(store.symbols().len(), 2);

        let soxx = store
            .records_on(d(2024, 1, 3))
            .iter()
            .find(|r| r.symbol == "SOXX")
            .unwrap();
        assert!(soxx.close.is_nan());
    }

    #[test]
    fn malformed_csv_is_an_error() {
        let bad = "date,symbol,close\nnot-a-date,NVDA,1.0\n";
        assert!(matches!(read_price_csv(bad.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn fetch_history_takes_trailing_dates_and_filters_symbols() {
        let store = read_price_csv(SAMPLE.as_bytes()).unwrap();
        let records = store
            .fetch_history(&symbols(&["NVDA"]), 2, d(2024, 1, 4))
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, d(2024, 1, 3));
        assert_eq!(records[1].date, d(2024, 1, 4));
        assert!(records.iter().all(|r| r.symbol == "NVDA"));
    }

    #[test]
    fn fetch_history_ignores_future_dates() {
        let store = read_price_csv(SAMPLE.as_bytes()).unwrap();
        let records = store
            .fetch_history(&symbols(&["NVDA", "SOXX"]), 10, d(2024, 1, 2))
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.date == d(2024, 1, 2)));
    }

    #[test]
    fn fetch_before_first_date_is_empty() {
        let store = read_price_csv(SAMPLE.as_bytes()).unwrap();
        let records = store
            .fetch_history(&symbols(&["NVDA"]), 10, d(2023, 12, 29))
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn synthetic_history_is_deterministic_and_skips_weekends() {
        let syms = symbols(&["NVDA", "AMD"]);
        let a = generate_synthetic_history(&syms, d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        let b = generate_synthetic_history(&syms, d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert!(a.is_synthetic());
        assert_eq!(a.dataset_hash(), b.dataset_hash());
        // January 2024 has 23 weekdays.
        assert_eq!(a.dates().len(), 23);
        assert_eq!(a.len(), 46);
        assert!(a
            .dates()
            .iter()
            .all(|d| d.weekday() != chrono::Weekday::Sat && d.weekday() != chrono::Weekday::Sun));
    }

    #[test]
    fn synthetic_symbols_diverge() {
        let store =
            generate_synthetic_history(&symbols(&["NVDA", "AMD"]), d(2024, 1, 1), d(2024, 1, 5))
                .unwrap();
        let last = store.records_on(d(2024, 1, 5));
        assert_ne!(last[0].close, last[1].close);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = generate_synthetic_history(&symbols(&["NVDA"]), d(2024, 2, 1), d(2024, 1, 1));
        assert!(matches!(result, Err(LoadError::InvalidRange(_))));
    }

    #[test]
    fn load_price_csv_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let store = load_price_csv(&path).unwrap();
        assert_eq!(store.len(), 6);
        assert!(!store.is_synthetic());

        let missing = load_price_csv(&dir.path().join("missing.csv"));
        assert!(matches!(missing, Err(LoadError::Io { .. })));
    }
}
