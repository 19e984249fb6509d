//! Per-day grouping of events, the today trim and the trailing moving average.

use std::collections::HashMap;

use chrono::NaiveDate;
use plot_core::error::{PlotError, Result};
use plot_core::models::Event;

// ── DailyCounts ───────────────────────────────────────────────────────────────

/// Event counts per calendar day, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyCounts {
    pub dates: Vec<NaiveDate>,
    /// `counts[i]` is the number of events on `dates[i]`.
    pub counts: Vec<usize>,
}

impl DailyCounts {
    /// Sum of all daily counts.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ── TrimmedDays ───────────────────────────────────────────────────────────────

/// Daily series with the most recent (incomplete) day split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedDays {
    pub dates: Vec<NaiveDate>,
    pub counts: Vec<usize>,
    /// Aligned with `dates`.
    pub comments: Vec<String>,
    /// Number of events on the excluded day.
    pub today_count: usize,
}

impl TrimmedDays {
    /// Sum of the counts that remain after the trim.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

// ── DayAggregator ─────────────────────────────────────────────────────────────

/// Stateless helper that turns events into daily series.
pub struct DayAggregator;

impl DayAggregator {
    /// Group `events` by calendar date, preserving the order in which each
    /// date is first seen.
    pub fn group_by_day(events: &[Event]) -> DailyCounts {
        let mut index: HashMap<NaiveDate, usize> = HashMap::new();
        let mut daily = DailyCounts::default();

        for event in events {
            let date = event.date();
            match index.get(&date) {
                Some(&i) => daily.counts[i] += 1,
                None => {
                    index.insert(date, daily.dates.len());
                    daily.dates.push(date);
                    daily.counts.push(1);
                }
            }
        }

        daily
    }

    /// Remove the last day (assumed incomplete) from the daily series and its
    /// comments, keeping its count as `today_count`.
    ///
    /// Fails with [`PlotError::InsufficientData`] unless at least two
    /// distinct days exist, and with [`PlotError::DegenerateData`] when the
    /// comments are not aligned one-per-day.
    pub fn trim_today(daily: DailyCounts, comments: &[String]) -> Result<TrimmedDays> {
        if daily.len() < 2 {
            return Err(PlotError::InsufficientData(format!(
                "at least 2 distinct days are required, found {}",
                daily.len()
            )));
        }
        if comments.len() != daily.len() {
            return Err(PlotError::DegenerateData(format!(
                "{} comments do not align with {} distinct days",
                comments.len(),
                daily.len()
            )));
        }

        let DailyCounts {
            mut dates,
            mut counts,
        } = daily;
        let mut comments = comments.to_vec();

        dates.pop();
        comments.pop();
        let today_count = counts.pop().unwrap_or_default();

        Ok(TrimmedDays {
            dates,
            counts,
            comments,
            today_count,
        })
    }

    /// Trailing moving average over `window` days.
    ///
    /// Value `i` is the mean of `counts[max(0, i + 1 - window) ..= i]`; near
    /// the start of the series the window is truncated and the divisor is the
    /// number of values actually averaged.
    pub fn moving_average(counts: &[usize], window: usize) -> Vec<f64> {
        let window = window.max(1);
        (0..counts.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(window);
                let slice = &counts[start..=i];
                slice.iter().sum::<usize>() as f64 / slice.len() as f64
            })
            .collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 1, d).unwrap()
    }

    fn event(d: u32, h: u32) -> Event {
        Event::new(day(d), NaiveTime::from_hms_opt(h, 0, 0).unwrap())
    }

    fn daily(counts: &[usize]) -> DailyCounts {
        DailyCounts {
            dates: (1..=counts.len() as u32).map(day).collect(),
            counts: counts.to_vec(),
        }
    }

    fn blank_comments(n: usize) -> Vec<String> {
        vec![String::new(); n]
    }

    // ── group_by_day ──────────────────────────────────────────────────────────

    #[test]
    fn test_group_by_day_counts() {
        let events = vec![event(1, 6), event(1, 9), event(2, 8), event(3, 7), event(3, 8)];
        let grouped = DayAggregator::group_by_day(&events);

        assert_eq!(grouped.dates, vec![day(1), day(2), day(3)]);
        assert_eq!(grouped.counts, vec![2, 1, 2]);
        assert_eq!(grouped.total(), events.len());
    }

    #[test]
    fn test_group_by_day_first_seen_order() {
        let events = vec![event(5, 6), event(2, 6), event(5, 9)];
        let grouped = DayAggregator::group_by_day(&events);

        assert_eq!(grouped.dates, vec![day(5), day(2)]);
        assert_eq!(grouped.counts, vec![2, 1]);
    }

    #[test]
    fn test_group_by_day_empty() {
        let grouped = DayAggregator::group_by_day(&[]);
        assert!(grouped.is_empty());
        assert_eq!(grouped.total(), 0);
    }

    // ── trim_today ────────────────────────────────────────────────────────────

    #[test]
    fn test_trim_today_splits_last_day() {
        let comments = vec!["a".to_string(), String::new(), "c".to_string()];
        let trimmed = DayAggregator::trim_today(daily(&[3, 5, 1]), &comments).unwrap();

        assert_eq!(trimmed.dates, vec![day(1), day(2)]);
        assert_eq!(trimmed.counts, vec![3, 5]);
        assert_eq!(trimmed.comments, vec!["a", ""]);
        assert_eq!(trimmed.today_count, 1);
    }

    #[test]
    fn test_trim_today_preserves_total() {
        let grouped = daily(&[4, 2, 7, 3]);
        let total = grouped.total();
        let trimmed = DayAggregator::trim_today(grouped, &blank_comments(4)).unwrap();
        assert_eq!(trimmed.total() + trimmed.today_count, total);
    }

    #[test]
    fn test_trim_today_single_day_is_insufficient() {
        let err = DayAggregator::trim_today(daily(&[4]), &blank_comments(1)).unwrap_err();
        assert!(matches!(err, PlotError::InsufficientData(_)));
    }

    #[test]
    fn test_trim_today_misaligned_comments() {
        let err = DayAggregator::trim_today(daily(&[4, 2]), &blank_comments(3)).unwrap_err();
        assert!(matches!(err, PlotError::DegenerateData(_)));
    }

    // ── moving_average ────────────────────────────────────────────────────────

    #[test]
    fn test_moving_average_first_value_is_first_count() {
        let avg = DayAggregator::moving_average(&[5, 1, 3], 7);
        assert_eq!(avg[0], 5.0);
    }

    #[test]
    fn test_moving_average_truncated_window() {
        let avg = DayAggregator::moving_average(&[2, 4, 6], 7);
        assert_eq!(avg, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_moving_average_full_window() {
        let counts = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let avg = DayAggregator::moving_average(&counts, 7);

        assert_eq!(avg.len(), counts.len());
        // i = 6: mean of 1..=7
        assert!((avg[6] - 4.0).abs() < 1e-12);
        // i = 8: mean of 3..=9
        assert!((avg[8] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_window_of_one_is_identity() {
        let avg = DayAggregator::moving_average(&[3, 0, 8], 1);
        assert_eq!(avg, vec![3.0, 0.0, 8.0]);
    }

    #[test]
    fn test_moving_average_empty() {
        assert!(DayAggregator::moving_average(&[], 7).is_empty());
    }
}
