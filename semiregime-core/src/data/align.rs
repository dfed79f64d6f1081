//! Long-to-wide reshaping of provider history into a `PriceTable`.
//!
//! Every symbol is aligned to the union of all dates. Missing, non-finite or
//! non-positive closes become NaN and are then resolved by forward fill
//! followed by back fill.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::provider::{DataError, PriceRecord};
use crate::domain::{PriceTable, Symbol};

/// Pivot long-format records into a gap-filled `PriceTable`.
///
/// Fails with `DataUnavailable` on empty input or when no record carries a
/// usable close, and with `ReshapeFailure` when the same (date, symbol) pair
/// appears twice.
pub fn pivot_records(records: &[PriceRecord]) -> Result<PriceTable, DataError> {
    if records.is_empty() {
        return Err(DataError::DataUnavailable("no history returned".into()));
    }

    let dates: Vec<NaiveDate> = records
        .iter()
        .map(|r| r.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let row_of: BTreeMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut seen: HashSet<(NaiveDate, &str)> = HashSet::with_capacity(records.len());
    let mut columns: BTreeMap<Symbol, Vec<f64>> = BTreeMap::new();

    for record in records {
        if !seen.insert((record.date, record.symbol.as_str())) {
            return Err(DataError::ReshapeFailure(format!(
                "duplicate close for {} on {}",
                record.symbol, record.date
            )));
        }
        let column = columns
            .entry(record.symbol.clone())
            .or_insert_with(|| vec![f64::NAN; dates.len()]);
        if record.close.is_finite() && record.close > 0.0 {
            column[row_of[&record.date]] = record.close;
        }
    }

    let table = PriceTable::new(dates, columns)?.with_filled_gaps();
    if !table.symbols().any(|s| table.has_observations(s)) {
        return Err(DataError::DataUnavailable(
            "history holds no finite positive close".into(),
        ));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, symbol: &str, close: f64) -> PriceRecord {
        PriceRecord::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            symbol,
            close,
        )
    }

    #[test]
    fn pivot_aligns_and_fills() {
        let records = vec![
            rec("2025-09-03", "SPY", 101.0),
            rec("2025-09-02", "SPY", 100.0),
            rec("2025-09-04", "SPY", 102.0),
            rec("2025-09-02", "SOXX", 200.0),
            // SOXX missing 2025-09-03
            rec("2025-09-04", "SOXX", 202.0),
        ];

        let table = pivot_records(&records).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.column("SPY").unwrap(), &[100.0, 101.0, 102.0]);
        assert_eq!(table.column("SOXX").unwrap(), &[200.0, 200.0, 202.0]);
    }

    #[test]
    fn leading_gap_is_back_filled() {
        let records = vec![
            rec("2025-09-02", "SPY", 100.0),
            rec("2025-09-03", "SPY", 101.0),
            rec("2025-09-03", "MU", 90.0),
        ];
        let table = pivot_records(&records).unwrap();
        assert_eq!(table.column("MU").unwrap(), &[90.0, 90.0]);
    }

    #[test]
    fn bad_prints_are_treated_as_missing() {
        let records = vec![
            rec("2025-09-02", "SPY", 100.0),
            rec("2025-09-03", "SPY", 0.0),
            rec("2025-09-04", "SPY", f64::NAN),
        ];
        let table = pivot_records(&records).unwrap();
        assert_eq!(table.column("SPY").unwrap(), &[100.0, 100.0, 100.0]);
    }

    #[test]
    fn history_without_usable_closes_is_unavailable() {
        let records = vec![
            rec("2025-09-02", "SPY", f64::NAN),
            rec("2025-09-02", "SOXX", 0.0),
            rec("2025-09-03", "SOXX", -5.0),
        ];
        let err = pivot_records(&records).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable(_)));
    }

    #[test]
    fn dead_column_survives_when_others_trade() {
        let records = vec![
            rec("2025-09-02", "SPY", 100.0),
            rec("2025-09-02", "MU", f64::NAN),
        ];
        let table = pivot_records(&records).unwrap();
        assert!(table.has_observations("SPY"));
        assert!(!table.has_observations("MU"));
    }

    #[test]
    fn empty_history_is_unavailable() {
        let err = pivot_records(&[]).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable(_)));
    }

    #[test]
    fn duplicate_rows_fail_reshape() {
        let records = vec![
            rec("2025-09-02", "SPY", 100.0),
            rec("2025-09-02", "SPY", 100.5),
        ];
        let err = pivot_records(&records).unwrap_err();
        assert!(matches!(err, DataError::ReshapeFailure(_)));
        assert!(err.to_string().contains("SPY"));
    }
}
