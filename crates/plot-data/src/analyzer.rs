//! Dispersion statistics of daily counts and gap analysis between events.

use chrono::TimeDelta;
use plot_core::error::{PlotError, Result};
use plot_core::models::{AnalysisConfig, DeltaExtreme, Event, TimePoint};
use tracing::debug;

// ── CountStatistics ───────────────────────────────────────────────────────────

/// Central tendency and spread of the (trimmed) events-per-day series.
#[derive(Debug, Clone, PartialEq)]
pub struct CountStatistics {
    pub min: usize,
    pub max: usize,
    pub average: f64,
    /// Element `n / 2` of the ascending-sorted counts. For even lengths this
    /// is the upper of the two middle values, never their mean.
    pub median: usize,
    pub midrange: f64,
    /// Population standard deviation (divides by `n`).
    pub standard_deviation: f64,
}

impl CountStatistics {
    /// Compute the statistics of `counts`.
    ///
    /// Fails with [`PlotError::InsufficientData`] for an empty slice.
    pub fn from_counts(counts: &[usize]) -> Result<Self> {
        let mut sorted = counts.to_vec();
        sorted.sort_unstable();

        let (Some(&min), Some(&max), Some(median)) =
            (sorted.first(), sorted.last(), lower_median(&sorted))
        else {
            return Err(PlotError::InsufficientData(
                "no daily counts to summarise".to_string(),
            ));
        };

        let n = counts.len() as f64;
        let average = counts.iter().sum::<usize>() as f64 / n;
        let variance = counts
            .iter()
            .map(|&c| (c as f64 - average).powi(2))
            .sum::<f64>()
            / n;

        Ok(Self {
            min,
            max,
            average,
            median,
            midrange: (min + max) as f64 / 2.0,
            standard_deviation: variance.sqrt(),
        })
    }

    /// Divisor that maps the median to `0.5` on a `[0, 1]` axis.
    ///
    /// Fails with [`PlotError::DegenerateData`] when the median is zero.
    pub fn normalization_factor(&self) -> Result<f64> {
        if self.median == 0 {
            return Err(PlotError::DegenerateData(
                "median events per day is zero; counts cannot be normalized".to_string(),
            ));
        }
        Ok(self.median as f64 * 2.0)
    }
}

/// Element at index `len / 2` of an ascending-sorted slice.
///
/// # Examples
///
/// ```
/// use plot_data::analyzer::lower_median;
///
/// assert_eq!(lower_median(&[1, 3, 3, 5, 9]), Some(3));
/// assert_eq!(lower_median(&[2, 4]), Some(4));
/// assert_eq!(lower_median(&[]), None);
/// ```
pub fn lower_median(sorted: &[usize]) -> Option<usize> {
    sorted.get(sorted.len() / 2).copied()
}

// ── DeltaStatistics ───────────────────────────────────────────────────────────

/// Shortest, longest and mean gap between consecutive events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaStatistics {
    pub min: DeltaExtreme,
    pub max: DeltaExtreme,
    /// Exact mean of all deltas.
    pub average: TimeDelta,
}

// ── EventAnalyzer ─────────────────────────────────────────────────────────────

/// Gap analysis over a chronological event sequence.
pub struct EventAnalyzer {
    config: AnalysisConfig,
}

impl EventAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Durations between each pair of consecutive events (`n - 1` values).
    ///
    /// Fails with [`PlotError::InsufficientData`] for fewer than two events
    /// and with [`PlotError::DegenerateData`] if the events go backwards.
    pub fn deltas(&self, events: &[Event]) -> Result<Vec<TimeDelta>> {
        if events.len() < 2 {
            return Err(PlotError::InsufficientData(format!(
                "at least 2 events are required, found {}",
                events.len()
            )));
        }

        let deltas: Vec<TimeDelta> = events
            .windows(2)
            .map(|pair| pair[1].timestamp - pair[0].timestamp)
            .collect();

        if let Some(i) = deltas.iter().position(|d| *d < TimeDelta::zero()) {
            return Err(PlotError::DegenerateData(format!(
                "event {} precedes the event before it ({})",
                events[i + 1].timestamp,
                events[i].timestamp
            )));
        }

        debug!("Computed {} deltas", deltas.len());
        Ok(deltas)
    }

    /// Min/max delta (first occurrence, with the event that closed it) and
    /// the exact mean delta.
    ///
    /// `deltas` must come from [`EventAnalyzer::deltas`] on the same events.
    pub fn delta_statistics(&self, events: &[Event], deltas: &[TimeDelta]) -> Result<DeltaStatistics> {
        if deltas.is_empty() || events.len() != deltas.len() + 1 {
            return Err(PlotError::InsufficientData(format!(
                "{} deltas do not describe {} events",
                deltas.len(),
                events.len()
            )));
        }

        let mut min_i = 0;
        let mut max_i = 0;
        for (i, delta) in deltas.iter().enumerate() {
            if *delta < deltas[min_i] {
                min_i = i;
            }
            if *delta > deltas[max_i] {
                max_i = i;
            }
        }

        let total = deltas
            .iter()
            .fold(TimeDelta::zero(), |acc, delta| acc + *delta);
        let n = i32::try_from(deltas.len()).map_err(|_| {
            PlotError::DegenerateData(format!("too many deltas to average: {}", deltas.len()))
        })?;

        Ok(DeltaStatistics {
            min: DeltaExtreme {
                delta: deltas[min_i],
                closed_at: events[min_i + 1].timestamp,
            },
            max: DeltaExtreme {
                delta: deltas[max_i],
                closed_at: events[max_i + 1].timestamp,
            },
            average: total / n,
        })
    }

    /// Events that closed a gap of at least the configured threshold and
    /// whose clock time lies strictly inside the quiet window.
    ///
    /// The first event has no predecessor and is never flagged.
    pub fn quiet_intervals(&self, events: &[Event]) -> Vec<TimePoint> {
        let markers: Vec<TimePoint> = events
            .windows(2)
            .filter(|pair| {
                let gap = pair[1].timestamp - pair[0].timestamp;
                gap >= self.config.quiet_gap && self.config.in_quiet_window(pair[1].time())
            })
            .map(|pair| TimePoint::from(&pair[1]))
            .collect();

        debug!("Flagged {} long quiet intervals", markers.len());
        markers
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
