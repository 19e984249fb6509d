//! Main analysis pipeline for the event plotter.
//!
//! Runs the parsed log through grouping, the today trim, count statistics,
//! normalization and gap analysis, returning an [`Analysis`] with the summary
//! record and the chart series.

use std::path::Path;

use chrono::{Days, NaiveDate};
use plot_core::error::{PlotError, Result};
use plot_core::models::{
    Analysis, AnalysisConfig, AxisTick, ChartSeries, ParsedLog, ReferenceLines, SummaryRecord,
    TimePoint,
};
use tracing::{debug, info, warn};

use crate::aggregator::DayAggregator;
use crate::analyzer::{CountStatistics, EventAnalyzer};
use crate::reader::read_log_file;

/// Hours labelled on the time-of-day axis.
pub const Y_AXIS_TICK_HOURS: [u32; 5] = [2, 7, 12, 17, 22];

/// Spacing, in days, of the major ticks on the date axis.
pub const DATE_TICK_INTERVAL_DAYS: u32 = 7;

/// Days of margin before the first and after the last event on the date axis.
const X_MARGIN_BEFORE: Days = Days::new(2);
const X_MARGIN_AFTER: Days = Days::new(1);

// ── Public functions ──────────────────────────────────────────────────────────

/// Read `path` and run the full pipeline on it.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<Analysis> {
    let parsed = read_log_file(path)?;
    analyze(&parsed, config)
}

/// Run the full statistics pipeline.
///
/// 1. Deltas between consecutive events (needs ≥ 2 events).
/// 2. Per-day grouping and the today trim (needs ≥ 2 distinct days).
/// 3. Count statistics and the normalization factor (median must be > 0).
/// 4. Moving average, quiet-interval markers and delta statistics.
/// 5. Summary record and chart series.
pub fn analyze(parsed: &ParsedLog, config: &AnalysisConfig) -> Result<Analysis> {
    config.validate()?;

    let events = &parsed.events;
    if events.is_empty() {
        return Err(PlotError::InsufficientData(
            "the log contains no events".to_string(),
        ));
    }

    let analyzer = EventAnalyzer::new(config.clone());

    // ── Step 1: Deltas ────────────────────────────────────────────────────────
    let deltas = analyzer.deltas(events)?;

    // ── Step 2: Days ──────────────────────────────────────────────────────────
    let daily = DayAggregator::group_by_day(events);
    debug!("Grouped {} events into {} days", events.len(), daily.len());
    let days = DayAggregator::trim_today(daily, &parsed.comments)?;

    // ── Step 3: Count statistics ──────────────────────────────────────────────
    let stats = CountStatistics::from_counts(&days.counts)?;
    let factor = stats.normalization_factor()?;

    if stats.max as f64 > factor {
        warn!(
            "Busiest day has {} events, more than twice the median of {}; \
             its normalized count exceeds 1.0",
            stats.max, stats.median
        );
    }

    // ── Step 4: Derived series ────────────────────────────────────────────────
    let moving_average = DayAggregator::moving_average(&days.counts, config.average_period);
    let markers = analyzer.quiet_intervals(events);
    let delta_stats = analyzer.delta_statistics(events, &deltas)?;

    // ── Step 5: Build result ──────────────────────────────────────────────────
    let summary = SummaryRecord {
        today_count: days.today_count,
        days_recorded: days.dates.len(),
        events_recorded: days.total(),
        min_per_day: stats.min,
        max_per_day: stats.max,
        average: stats.average,
        median: stats.median,
        midrange: stats.midrange,
        standard_deviation: stats.standard_deviation,
        min_delta: delta_stats.min,
        max_delta: delta_stats.max,
        average_delta: delta_stats.average,
        quiet_interval_count: markers.len(),
    };

    let series = ChartSeries {
        counts_per_day_normalized: days.counts.iter().map(|&c| c as f64 / factor).collect(),
        moving_average_normalized: moving_average.iter().map(|&v| v / factor).collect(),
        event_points: events.iter().map(TimePoint::from).collect(),
        long_quiet_interval_markers: markers,
        reference_lines: reference_lines(&stats, factor),
        x_range: x_range(events[0].date(), events[events.len() - 1].date()),
        date_tick_interval_days: DATE_TICK_INTERVAL_DAYS,
        y_ticks: y_ticks(),
        distinct_dates: days.dates,
        comments: days.comments,
    };

    info!(
        "Analysed {} events over {} days ({} quiet intervals)",
        events.len(),
        summary.days_recorded,
        summary.quiet_interval_count
    );

    Ok(Analysis { summary, series })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Median, extremes and one-standard-deviation band on the normalized axis.
fn reference_lines(stats: &CountStatistics, factor: f64) -> ReferenceLines {
    let median = stats.median as f64;
    ReferenceLines {
        median: median / factor,
        min: stats.min as f64 / factor,
        max: stats.max as f64 / factor,
        upper_deviation: (median + stats.standard_deviation) / factor,
        lower_deviation: (median - stats.standard_deviation) / factor,
    }
}

fn x_range(first: NaiveDate, last: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        first.checked_sub_days(X_MARGIN_BEFORE).unwrap_or(first),
        last.checked_add_days(X_MARGIN_AFTER).unwrap_or(last),
    )
}

fn y_ticks() -> Vec<AxisTick> {
    Y_AXIS_TICK_HOURS
        .iter()
        .map(|&h| AxisTick {
            label: format!("{:02}h", h),
            position: f64::from(h) / 24.0,
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_log;
    use chrono::TimeDelta;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn run(text: &str) -> Result<Analysis> {
        let parsed = parse_log(Cursor::new(text))?;
        analyze(&parsed, &AnalysisConfig::default())
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 1, d).unwrap()
    }

    /// Five days, newest first; Jan 5 is "today".
    const WEEK: &str = "\
180105
0650 0900

180104
# travel
0715 1000 1300

180103
0600 0900 1200 1500

180102
0800

180101
0600 0930 1400
";

    // ── happy path ────────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_summary() {
        let analysis = run(WEEK).unwrap();
        let s = &analysis.summary;

        assert_eq!(s.today_count, 2);
        assert_eq!(s.days_recorded, 4);
        assert_eq!(s.events_recorded, 11);
        assert_eq!(s.min_per_day, 1);
        assert_eq!(s.max_per_day, 4);
        // counts [3, 1, 4, 3] → sorted [1, 3, 3, 4]
        assert_eq!(s.median, 3);
        assert!((s.average - 2.75).abs() < 1e-12);
        assert!((s.midrange - 2.5).abs() < 1e-12);
        // variance = (0.0625 + 3.0625 + 1.5625 + 0.0625) / 4 = 1.1875
        assert!((s.standard_deviation - 1.1875_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_totals_add_up() {
        let analysis = run(WEEK).unwrap();
        let s = &analysis.summary;
        assert_eq!(s.events_recorded + s.today_count, 13);
        assert_eq!(analysis.series.event_points.len(), 13);
    }

    #[test]
    fn test_analyze_series_alignment() {
        let series = run(WEEK).unwrap().series;

        assert_eq!(series.distinct_dates, vec![date(1), date(2), date(3), date(4)]);
        assert_eq!(series.comments, vec!["", "", "", "travel"]);
        assert_eq!(series.counts_per_day_normalized.len(), 4);
        assert_eq!(series.moving_average_normalized.len(), 4);
    }

    #[test]
    fn test_analyze_normalization_puts_median_at_half() {
        let series = run(WEEK).unwrap().series;

        // factor = 2 × 3 = 6
        assert!((series.counts_per_day_normalized[0] - 0.5).abs() < 1e-12);
        assert!((series.counts_per_day_normalized[1] - 1.0 / 6.0).abs() < 1e-12);
        assert!((series.reference_lines.median - 0.5).abs() < 1e-12);
        assert!((series.reference_lines.max - 4.0 / 6.0).abs() < 1e-12);
        // moving average [3, 2, 8/3, 2.75] / 6
        assert!((series.moving_average_normalized[0] - 0.5).abs() < 1e-12);
        assert!((series.moving_average_normalized[1] - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_quiet_intervals() {
        let analysis = run(WEEK).unwrap();
        let markers = &analysis.series.long_quiet_interval_markers;

        // Gaps closing at Jan 2 08:00 and Jan 3 06:00 fall outside the window;
        // Jan 4 07:15 and Jan 5 06:50 are inside it.
        assert_eq!(analysis.summary.quiet_interval_count, 2);
        assert_eq!(markers[0].date, date(4));
        assert_eq!(markers[1].date, date(5));
    }

    #[test]
    fn test_analyze_delta_extremes() {
        let s = run(WEEK).unwrap().summary;

        // Shortest gap: Jan 5 06:50 → 09:00.
        assert_eq!(s.min_delta.delta, TimeDelta::minutes(130));
        assert_eq!(s.min_delta.closed_at, date(5).and_hms_opt(9, 0, 0).unwrap());
        // Longest gap: Jan 2 08:00 → Jan 3 06:00.
        assert_eq!(s.max_delta.delta, TimeDelta::hours(22));
        assert_eq!(s.max_delta.closed_at, date(3).and_hms_opt(6, 0, 0).unwrap());
    }

    #[test]
    fn test_analyze_average_delta_is_exact() {
        let s = run(WEEK).unwrap().summary;
        // Jan 1 06:00 → Jan 5 09:00 = 99h over 12 deltas = 8h15m
        assert_eq!(s.average_delta, TimeDelta::minutes(8 * 60 + 15));
    }

    #[test]
    fn test_analyze_axes() {
        let series = run(WEEK).unwrap().series;
        assert_eq!(
            series.x_range,
            (NaiveDate::from_ymd_opt(2017, 12, 30).unwrap(), date(6))
        );
        assert_eq!(series.date_tick_interval_days, 7);
        let labels: Vec<&str> = series.y_ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["02h", "07h", "12h", "17h", "22h"]);
        assert!((series.y_ticks[2].position - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_minimal_two_day_log() {
        let analysis = run("180102\n0800\n\n180101\n0600 0700\n").unwrap();
        let s = &analysis.summary;

        assert_eq!(s.today_count, 1);
        assert_eq!(s.days_recorded, 1);
        assert_eq!(s.median, 2);
        assert_eq!(s.min_delta.delta, TimeDelta::hours(1));
        assert_eq!(s.max_delta.delta, TimeDelta::hours(25));
    }

    #[test]
    fn test_analyze_comment_lands_on_post_trim_index() {
        let text = "180103\n0900\n\n180102\n# hello\n0800\n\n180101\n0600\n";
        let series = run(text).unwrap().series;

        assert_eq!(series.distinct_dates, vec![date(1), date(2)]);
        assert_eq!(series.comments, vec!["", "hello"]);
    }

    #[test]
    fn test_analyze_custom_average_period() {
        let parsed = parse_log(Cursor::new(WEEK)).unwrap();
        let config = AnalysisConfig {
            average_period: 1,
            ..Default::default()
        };
        let series = analyze(&parsed, &config).unwrap().series;
        assert_eq!(
            series.moving_average_normalized,
            series.counts_per_day_normalized
        );
    }

    // ── failures ──────────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_empty_input() {
        assert!(matches!(run(""), Err(PlotError::InsufficientData(_))));
    }

    #[test]
    fn test_analyze_single_event() {
        assert!(matches!(
            run("180101\n0600\n"),
            Err(PlotError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_analyze_single_day() {
        let err = run("180101\n0600 0700 0800\n").unwrap_err();
        match err {
            PlotError::InsufficientData(msg) => assert!(msg.contains("distinct days")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_analyze_invalid_config() {
        let parsed = parse_log(Cursor::new(WEEK)).unwrap();
        let config = AnalysisConfig {
            average_period: 0,
            ..Default::default()
        };
        assert!(matches!(
            analyze(&parsed, &config),
            Err(PlotError::Config(_))
        ));
    }

    // ── analyze_file ──────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_file() {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(WEEK.as_bytes()).unwrap();

        let analysis = analyze_file(file.path(), &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.summary.days_recorded, 4);
    }

    #[test]
    fn test_analyze_file_propagates_parse_error() {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(b"180102\n0800\n\n18010\n0600\n").unwrap();

        let err = analyze_file(file.path(), &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, PlotError::MalformedDate { line: 4, .. }));
    }
}
