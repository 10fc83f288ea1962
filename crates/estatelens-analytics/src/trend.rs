use chrono::{Datelike, Months, NaiveDate};
use estatelens_models::{TransactionRecord, TrendDirection, TrendSummary};
use tracing::debug;

/// Change rates strictly beyond ±this value are reported as a trend.
pub const TREND_THRESHOLD_PERCENT: f64 = 2.0;

const RECENT_WINDOW_MONTHS: u32 = 3;
const PRIOR_WINDOW_MONTHS: u32 = 6;

/// Compute the headline trend indicators for a batch of records.
///
/// Only records with a positive amount take part. The recent window starts on
/// the first day of the month three months before `now`'s month; the prior
/// window covers the three months before that. Records whose year/month/day is
/// not a real calendar date still count toward the overall average but belong
/// to neither window.
pub fn classify_trend(records: &[TransactionRecord], now: NaiveDate) -> TrendSummary {
    let validated: Vec<&TransactionRecord> = records.iter().filter(|r| r.is_validated()).collect();
    if validated.is_empty() {
        return TrendSummary::default();
    }

    let overall_average = mean(validated.iter().copied());

    let change_rate_percent = match window_bounds(now) {
        Some((prior_start, recent_start)) => {
            let mut recent = Vec::new();
            let mut prior = Vec::new();
            for record in &validated {
                match record.deal_date() {
                    Some(date) if date >= recent_start => recent.push(*record),
                    Some(date) if date >= prior_start => prior.push(*record),
                    Some(_) => {}
                    None => debug!(id = %record.id, "Skipping record with invalid deal date"),
                }
            }
            change_rate(&recent, &prior)
        }
        None => 0.0,
    };

    TrendSummary {
        overall_average,
        change_rate_percent,
        trend_direction: direction_for(change_rate_percent),
        total_count: validated.len(),
    }
}

/// Map a change rate to a direction using the fixed ±2% band (exclusive).
pub fn direction_for(change_rate_percent: f64) -> TrendDirection {
    if change_rate_percent > TREND_THRESHOLD_PERCENT {
        TrendDirection::Up
    } else if change_rate_percent < -TREND_THRESHOLD_PERCENT {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    }
}

/// (prior window start, recent window start)
fn window_bounds(now: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let month_start = now.with_day(1)?;
    let recent_start = month_start.checked_sub_months(Months::new(RECENT_WINDOW_MONTHS))?;
    let prior_start = month_start.checked_sub_months(Months::new(PRIOR_WINDOW_MONTHS))?;
    Some((prior_start, recent_start))
}

fn change_rate(recent: &[&TransactionRecord], prior: &[&TransactionRecord]) -> f64 {
    if recent.is_empty() || prior.is_empty() {
        return 0.0;
    }
    let recent_avg = mean(recent.iter().copied());
    let prior_avg = mean(prior.iter().copied());
    (recent_avg - prior_avg) / prior_avg * 100.0
}

fn mean<'a>(records: impl Iterator<Item = &'a TransactionRecord>) -> f64 {
    let (sum, count) = records.fold((0u128, 0usize), |(sum, count), r| {
        (sum + r.deal_amount as u128, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 15).unwrap()
    }

    #[test]
    fn empty_batch_is_zero_and_stable() {
        assert_eq!(classify_trend(&[], now()), TrendSummary::default());
    }

    #[test]
    fn all_zero_amounts_are_zero_and_stable() {
        let records = vec![record(2024, 9, 1, 0), record(2024, 5, 1, 0)];
        assert_eq!(classify_trend(&records, now()), TrendSummary::default());
    }

    #[test]
    fn ten_percent_rise_is_up() {
        let records = vec![
            record(2024, 8, 3, 100),
            record(2024, 10, 2, 120),
            record(2024, 5, 11, 90),
            record(2024, 6, 30, 110),
        ];

        let summary = classify_trend(&records, now());
        assert!((summary.change_rate_percent - 10.0).abs() < 1e-9);
        assert_eq!(summary.trend_direction, TrendDirection::Up);
        assert_eq!(summary.total_count, 4);
        assert!((summary.overall_average - 105.0).abs() < 1e-9);
    }

    #[test]
    fn exactly_two_percent_is_stable() {
        let records = vec![record(2024, 9, 1, 102), record(2024, 4, 1, 100)];
        let summary = classify_trend(&records, now());
        assert!((summary.change_rate_percent - 2.0).abs() < 1e-9);
        assert_eq!(summary.trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn three_percent_fall_is_down() {
        let records = vec![record(2024, 7, 1, 97), record(2024, 6, 30, 100)];
        let summary = classify_trend(&records, now());
        assert!((summary.change_rate_percent + 3.0).abs() < 1e-9);
        assert_eq!(summary.trend_direction, TrendDirection::Down);
    }

    #[test]
    fn window_starts_on_first_of_month() {
        // 2024-07-01 is the first recent day, 2024-04-01 the first prior day;
        // 2024-03-31 is outside both windows.
        let records = vec![
            record(2024, 7, 1, 200),
            record(2024, 4, 1, 100),
            record(2024, 3, 31, 1_000_000),
        ];
        let summary = classify_trend(&records, now());
        assert!((summary.change_rate_percent - 100.0).abs() < 1e-9);
        assert_eq!(summary.total_count, 3);
    }

    #[test]
    fn missing_prior_window_gives_zero_rate() {
        let records = vec![record(2024, 9, 1, 100), record(2024, 10, 1, 300)];
        let summary = classify_trend(&records, now());
        assert_eq!(summary.change_rate_percent, 0.0);
        assert_eq!(summary.trend_direction, TrendDirection::Stable);
        assert!((summary.overall_average - 200.0).abs() < 1e-9);
    }

    #[test]
    fn zero_amounts_excluded_from_count_and_windows() {
        let records = vec![
            record(2024, 9, 1, 110),
            record(2024, 9, 2, 0),
            record(2024, 5, 1, 100),
            record(2024, 5, 2, 0),
        ];
        let summary = classify_trend(&records, now());
        assert_eq!(summary.total_count, 2);
        assert!((summary.change_rate_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_dates_only_affect_average() {
        let records = vec![
            record(2024, 9, 1, 110),
            record(2024, 5, 1, 100),
            record(2024, 2, 31, 400),
        ];
        let summary = classify_trend(&records, now());
        assert_eq!(summary.total_count, 3);
        assert!((summary.change_rate_percent - 10.0).abs() < 1e-9);
        assert!((summary.overall_average - 610.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn direction_thresholds_are_exclusive() {
        assert_eq!(direction_for(2.0), TrendDirection::Stable);
        assert_eq!(direction_for(-2.0), TrendDirection::Stable);
        assert_eq!(direction_for(2.01), TrendDirection::Up);
        assert_eq!(direction_for(-2.01), TrendDirection::Down);
    }
}
