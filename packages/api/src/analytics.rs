//! Month bucketing and growth math for the admin reports.
//!
//! Series are anchored to the caller-supplied `now` (current month first,
//! matching the dashboard's ordering) and zero-filled so every report has a
//! fixed-length, month-ordered shape regardless of data sparsity.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One trailing calendar month: `[start, end]` inclusive, with the display
/// name and year the dashboard labels buckets with.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub month_name: &'static str,
    pub year: i32,
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn first_of_month_back(now: NaiveDateTime, months_back: u32) -> NaiveDate {
    let total = now.date().year() * 12 + now.date().month0() as i32 - months_back as i32;
    let (year, month0) = (total.div_euclid(12), total.rem_euclid(12) as u32);
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(now.date())
}

fn end_of_month(start: NaiveDate) -> NaiveDateTime {
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    next.and_then(|d| d.pred_opt())
        .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
        .unwrap_or_else(|| start.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// The `n` trailing calendar months, current month first. The current
/// month's end is `now`; earlier months end on their last millisecond.
pub fn month_ranges(now: NaiveDateTime, n: u32) -> Vec<MonthRange> {
    (0..n)
        .map(|i| {
            let start = first_of_month_back(now, i);
            MonthRange {
                start: start.and_hms_opt(0, 0, 0).unwrap_or_default(),
                end: if i == 0 { now } else { end_of_month(start) },
                month_name: MONTH_NAMES[start.month0() as usize],
                year: start.year(),
            }
        })
        .collect()
}

/// Zero-filled month series: for each range, sum `value` over the documents
/// whose timestamp falls inside it.
pub fn fill_series<T>(
    ranges: &[MonthRange],
    docs: &[T],
    timestamp: impl Fn(&T) -> NaiveDateTime,
    value: impl Fn(&T) -> f64,
) -> Vec<f64> {
    ranges
        .iter()
        .map(|range| {
            docs.iter()
                .filter(|doc| {
                    let at = timestamp(doc);
                    at >= range.start && at <= range.end
                })
                .map(&value)
                .sum()
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthRate {
    pub rate: f64,
    pub change: f64,
    pub note: String,
}

/// Month-over-month growth. A zero previous month with activity now reports
/// the capped 100% figure instead of dividing by zero.
pub fn growth_rate(current: f64, previous: f64, label: &str) -> GrowthRate {
    if previous == 0.0 && current > 0.0 {
        return GrowthRate {
            rate: 100.0,
            change: current,
            note: format!("{label} started this month"),
        };
    }
    if previous == 0.0 && current == 0.0 {
        return GrowthRate {
            rate: 0.0,
            change: 0.0,
            note: format!("No {label} in either month"),
        };
    }
    let change = current - previous;
    let rate = ((change / previous) * 100.0 * 100.0).round() / 100.0;
    let note = if change > 0.0 {
        "Increase"
    } else if change < 0.0 {
        "Decrease"
    } else {
        "No change"
    };
    GrowthRate {
        rate,
        change,
        note: note.to_string(),
    }
}

/// This month as a whole-number percentage of last month; a zero last month
/// scales the current value by 100 instead of dividing.
pub fn percentage_of(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return current * 100.0;
    }
    ((current / previous) * 100.0).round()
}

pub fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn six_ranges_current_month_first() {
        let ranges = month_ranges(anchor(), 6);
        assert_eq!(ranges.len(), 6);

        assert_eq!(ranges[0].month_name, "February");
        assert_eq!(ranges[0].year, 2026);
        assert_eq!(ranges[0].end, anchor());

        assert_eq!(ranges[1].month_name, "January");
        assert_eq!(ranges[5].month_name, "September");
        assert_eq!(ranges[5].year, 2025);
    }

    #[test]
    fn ranges_cross_year_boundaries() {
        let ranges = month_ranges(anchor(), 12);
        assert_eq!(ranges[11].month_name, "March");
        assert_eq!(ranges[11].year, 2025);
        assert_eq!(
            ranges[11].start.date(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }

    #[test]
    fn closed_months_end_on_their_last_millisecond() {
        let ranges = month_ranges(anchor(), 2);
        let january_end = ranges[1].end;
        assert_eq!(
            january_end.date(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
        assert_eq!(january_end.time().format("%H:%M:%S").to_string(), "23:59:59");
    }

    #[test]
    fn series_is_zero_filled() {
        let ranges = month_ranges(anchor(), 3);
        let in_january = NaiveDate::from_ymd_opt(2026, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let docs = vec![(in_january, 250.0), (in_january, 150.0)];

        let series = fill_series(&ranges, &docs, |d| d.0, |d| d.1);

        assert_eq!(series, vec![0.0, 400.0, 0.0]);
    }

    #[test]
    fn docs_outside_every_range_are_dropped() {
        let ranges = month_ranges(anchor(), 2);
        let long_ago = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let series = fill_series(&ranges, &[(long_ago, 99.0)], |d| d.0, |d| d.1);
        assert_eq!(series, vec![0.0, 0.0]);
    }

    #[test]
    fn growth_from_zero_is_capped_at_100() {
        let growth = growth_rate(12.0, 0.0, "orders");
        assert_eq!(growth.rate, 100.0);
        assert_eq!(growth.change, 12.0);
        assert_eq!(growth.note, "orders started this month");
    }

    #[test]
    fn growth_with_no_activity_is_zero() {
        let growth = growth_rate(0.0, 0.0, "users");
        assert_eq!(growth.rate, 0.0);
        assert_eq!(growth.note, "No users in either month");
    }

    #[test]
    fn growth_is_signed_and_rounded_to_two_decimals() {
        let up = growth_rate(150.0, 120.0, "revenue");
        assert_eq!(up.rate, 25.0);
        assert_eq!(up.note, "Increase");

        let down = growth_rate(100.0, 300.0, "revenue");
        assert!((down.rate - -66.67).abs() < 1e-9);
        assert_eq!(down.note, "Decrease");
    }

    #[test]
    fn percentage_of_handles_a_zero_baseline() {
        assert_eq!(percentage_of(3.0, 0.0), 300.0);
        assert_eq!(percentage_of(30.0, 20.0), 150.0);
    }
}
