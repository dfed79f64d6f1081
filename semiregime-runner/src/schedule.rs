//! Rebalance cadence: which trading dates fire a rebalance trigger.
//!
//! The cadence is evaluated against the previous trading date in the
//! calendar, so "first trading day of the week/month" holds across holidays.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceCadence {
    /// Every trading date.
    Daily,
    /// First trading date of each ISO week.
    Weekly,
    /// First trading date of each calendar month.
    #[default]
    Monthly,
}

impl RebalanceCadence {
    /// Whether `date` is a trigger, given the previous trading date (if any).
    ///
    /// The first date of a calendar is always a trigger.
    pub fn is_trigger(self, previous: Option<NaiveDate>, date: NaiveDate) -> bool {
        let Some(prev) = previous else {
            return true;
        };
        match self {
            RebalanceCadence::Daily => true,
            RebalanceCadence::Weekly => prev.iso_week() != date.iso_week(),
            RebalanceCadence::Monthly => (prev.year(), prev.month()) != (date.year(), date.month()),
        }
    }

    /// Trigger dates within an ordered trading calendar.
    pub fn triggers(self, calendar: &[NaiveDate]) -> Vec<NaiveDate> {
        calendar
            .iter()
            .enumerate()
            .filter(|(i, date)| {
                let prev = i.checked_sub(1).map(|j| calendar[j]);
                self.is_trigger(prev, **date)
            })
            .map(|(_, date)| *date)
            .collect()
    }
}

impl fmt::Display for RebalanceCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RebalanceCadence::Daily => "daily",
            RebalanceCadence::Weekly => "weekly",
            RebalanceCadence::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

impl FromStr for RebalanceCadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(RebalanceCadence::Daily),
            "weekly" => Ok(RebalanceCadence::Weekly),
            "monthly" => Ok(RebalanceCadence::Monthly),
            other => Err(format!(
                "unknown cadence '{other}' (expected daily, weekly or monthly)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Weekdays from 2025-09-26 (Fri) to 2025-10-08 (Wed).
    fn calendar() -> Vec<NaiveDate> {
        [
            "2025-09-26", "2025-09-29", "2025-09-30", "2025-10-01", "2025-10-02", "2025-10-03",
            "2025-10-06", "2025-10-07", "2025-10-08",
        ]
        .iter()
        .map(|s| d(s))
        .collect()
    }

    #[test]
    fn daily_fires_every_date() {
        assert_eq!(RebalanceCadence::Daily.triggers(&calendar()).len(), 9);
    }

    #[test]
    fn weekly_fires_on_first_trading_day_of_week() {
        let triggers = RebalanceCadence::Weekly.triggers(&calendar());
        assert_eq!(
            triggers,
            vec![d("2025-09-26"), d("2025-09-29"), d("2025-10-06")]
        );
    }

    #[test]
    fn monthly_fires_on_first_trading_day_of_month() {
        let triggers = RebalanceCadence::Monthly.triggers(&calendar());
        assert_eq!(triggers, vec![d("2025-09-26"), d("2025-10-01")]);
    }

    #[test]
    fn holiday_monday_moves_weekly_trigger_to_tuesday() {
        let cal = vec![d("2025-08-29"), d("2025-09-02"), d("2025-09-03")];
        assert_eq!(
            RebalanceCadence::Weekly.triggers(&cal),
            vec![d("2025-08-29"), d("2025-09-02")]
        );
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("Weekly".parse::<RebalanceCadence>().unwrap(), RebalanceCadence::Weekly);
        assert!("hourly".parse::<RebalanceCadence>().is_err());
        assert_eq!(RebalanceCadence::Monthly.to_string(), "monthly");
        assert_eq!(RebalanceCadence::default(), RebalanceCadence::Monthly);
    }
}
