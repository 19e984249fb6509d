use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Serialize, Serializer};

use crate::error::{PlotError, Result};
use crate::time_utils::normalized_time_of_day;

/// Default trailing window, in days, of the moving average.
pub const DEFAULT_AVERAGE_PERIOD: usize = 7;
/// Default minimum gap, in hours, before an event can close a quiet interval.
pub const DEFAULT_QUIET_GAP_HOURS: i64 = 6;
/// Default exclusive lower bound of the quiet window, in minutes after midnight (06:30).
pub const DEFAULT_QUIET_WINDOW_START_MINUTES: i64 = 6 * 60 + 30;
/// Default exclusive upper bound of the quiet window, in minutes after midnight (08:00).
pub const DEFAULT_QUIET_WINDOW_END_MINUTES: i64 = 8 * 60;

// ── Parsed log ────────────────────────────────────────────────────────────────

/// A single recorded timestamp (minute resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Event {
    pub timestamp: NaiveDateTime,
}

impl Event {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            timestamp: date.and_time(time),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// Clock time of the event on a `[0.0, 1.0)` day scale.
    pub fn normalized_time(&self) -> f64 {
        normalized_time_of_day(self.time())
    }
}

/// Output of the log parser: chronological events and one comment per
/// day-block, both oldest-first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLog {
    pub events: Vec<Event>,
    /// Free-text comment per day-block; empty string when the block had none.
    pub comments: Vec<String>,
}

impl ParsedLog {
    pub fn total_events(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ── Analysis configuration ────────────────────────────────────────────────────

/// Tunables of the statistics engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Trailing window of the moving average, in days.
    pub average_period: usize,
    /// Minimum gap (inclusive) before an event can be a quiet-interval marker.
    pub quiet_gap: TimeDelta,
    /// Exclusive lower bound of the quiet-interval clock window.
    pub quiet_window_start: NaiveTime,
    /// Exclusive upper bound of the quiet-interval clock window.
    pub quiet_window_end: NaiveTime,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            average_period: DEFAULT_AVERAGE_PERIOD,
            quiet_gap: TimeDelta::hours(DEFAULT_QUIET_GAP_HOURS),
            quiet_window_start: NaiveTime::MIN
                + TimeDelta::minutes(DEFAULT_QUIET_WINDOW_START_MINUTES),
            quiet_window_end: NaiveTime::MIN + TimeDelta::minutes(DEFAULT_QUIET_WINDOW_END_MINUTES),
        }
    }
}

impl AnalysisConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.average_period == 0 {
            return Err(PlotError::Config(
                "average period must be at least 1 day".to_string(),
            ));
        }
        if self.quiet_gap <= TimeDelta::zero() {
            return Err(PlotError::Config(
                "quiet gap threshold must be positive".to_string(),
            ));
        }
        if self.quiet_window_start >= self.quiet_window_end {
            return Err(PlotError::Config(format!(
                "quiet window start {} must be before end {}",
                self.quiet_window_start.format("%H:%M"),
                self.quiet_window_end.format("%H:%M")
            )));
        }
        Ok(())
    }

    /// Whether `time` lies strictly inside the quiet-interval window.
    pub fn in_quiet_window(&self, time: NaiveTime) -> bool {
        time > self.quiet_window_start && time < self.quiet_window_end
    }
}

// ── Summary record ────────────────────────────────────────────────────────────

/// An extreme inter-event gap and the event that closed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeltaExtreme {
    #[serde(rename = "seconds", serialize_with = "serialize_seconds")]
    pub delta: TimeDelta,
    pub closed_at: NaiveDateTime,
}

/// Scalar statistics of one run, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    /// Events on the most recent (excluded) day.
    pub today_count: usize,
    /// Distinct days after the today trim.
    pub days_recorded: usize,
    /// Events on the trimmed days.
    pub events_recorded: usize,
    pub min_per_day: usize,
    pub max_per_day: usize,
    pub average: f64,
    /// Lower-median: element `n / 2` of the ascending-sorted daily counts.
    pub median: usize,
    pub midrange: f64,
    /// Population standard deviation of the daily counts.
    pub standard_deviation: f64,
    pub min_delta: DeltaExtreme,
    pub max_delta: DeltaExtreme,
    #[serde(rename = "average_delta_seconds", serialize_with = "serialize_seconds")]
    pub average_delta: TimeDelta,
    pub quiet_interval_count: usize,
}

fn serialize_seconds<S: Serializer>(
    delta: &TimeDelta,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_i64(delta.num_seconds())
}

// ── Chart series ──────────────────────────────────────────────────────────────

/// A point on the date × time-of-day plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    /// Clock time scaled to `[0.0, 1.0)`.
    pub time: f64,
}

impl From<&Event> for TimePoint {
    fn from(event: &Event) -> Self {
        Self {
            date: event.date(),
            time: event.normalized_time(),
        }
    }
}

/// Horizontal rules on the normalized count axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceLines {
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub upper_deviation: f64,
    pub lower_deviation: f64,
}

/// A labelled tick on the time-of-day axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub label: String,
    pub position: f64,
}

/// Everything a renderer needs to draw the time-distribution chart.
///
/// Count-derived series are divided by `2 × median` so the median sits at
/// `0.5` on the same `[0, 1]` axis as the time-of-day scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub distinct_dates: Vec<NaiveDate>,
    pub counts_per_day_normalized: Vec<f64>,
    pub moving_average_normalized: Vec<f64>,
    pub event_points: Vec<TimePoint>,
    pub long_quiet_interval_markers: Vec<TimePoint>,
    /// Aligned with `distinct_dates`.
    pub comments: Vec<String>,
    pub reference_lines: ReferenceLines,
    pub x_range: (NaiveDate, NaiveDate),
    /// Spacing of the major ticks on the date axis.
    pub date_tick_interval_days: u32,
    pub y_ticks: Vec<AxisTick>,
}

/// Complete result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub summary: SummaryRecord,
    pub series: ChartSeries,
}

// ── Tests ──────────────────────────────────────────────────────────────────────
