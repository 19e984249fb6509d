use chrono::{NaiveDateTime, TimeDelta};

use crate::models::{DeltaExtreme, SummaryRecord};

/// Width of the right-aligned label column in the printed summary.
pub const LABEL_WIDTH: usize = 18;

/// Format a count-derived statistic with two decimal places.
///
/// # Examples
///
/// ```
/// use plot_core::formatting::format_stat;
///
/// assert_eq!(format_stat(3.0), "3.00");
/// assert_eq!(format_stat(4.256), "4.26");
/// ```
pub fn format_stat(value: f64) -> String {
    format!("{:.2}", value)
}

/// Format a duration truncated to whole seconds.
///
/// * under a day → `"H:MM:SS"`
/// * one day or more → `"1 day, H:MM:SS"` / `"N days, H:MM:SS"`
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use plot_core::formatting::format_delta;
///
/// assert_eq!(format_delta(TimeDelta::minutes(60)), "1:00:00");
/// assert_eq!(format_delta(TimeDelta::hours(25)), "1 day, 1:00:00");
/// assert_eq!(format_delta(TimeDelta::hours(50)), "2 days, 2:00:00");
/// assert_eq!(format_delta(TimeDelta::milliseconds(90_500)), "0:01:30");
/// ```
pub fn format_delta(delta: TimeDelta) -> String {
    let total = delta.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => format!("{}{}", sign, clock),
        1 => format!("{}1 day, {}", sign, clock),
        n => format!("{}{} days, {}", sign, n, clock),
    }
}

/// Format an event timestamp at minute resolution.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// `"<delta> on <closing event>"`, as shown for min/max deltas.
pub fn format_delta_extreme(extreme: &DeltaExtreme) -> String {
    format!(
        "{} on {}",
        format_delta(extreme.delta),
        format_timestamp(extreme.closed_at)
    )
}

/// Label/value pairs of the summary, in print order.
pub fn summary_fields(summary: &SummaryRecord) -> Vec<(&'static str, String)> {
    vec![
        ("Today", summary.today_count.to_string()),
        ("Days recorded", summary.days_recorded.to_string()),
        ("Events recorded", summary.events_recorded.to_string()),
        ("Min events per day", summary.min_per_day.to_string()),
        ("Max events per day", summary.max_per_day.to_string()),
        ("Per day average", format_stat(summary.average)),
        ("Per day median", format_stat(summary.median as f64)),
        ("Per day midrange", format_stat(summary.midrange)),
        ("Std deviation", format_stat(summary.standard_deviation)),
        ("Min delta", format_delta_extreme(&summary.min_delta)),
        ("Max delta", format_delta_extreme(&summary.max_delta)),
        ("Average delta", format_delta(summary.average_delta)),
        ("Quiet intervals", summary.quiet_interval_count.to_string()),
    ]
}

/// Render the summary as `label : value` lines with right-aligned labels.
pub fn render_summary(summary: &SummaryRecord) -> String {
    summary_fields(summary)
        .into_iter()
        .map(|(label, value)| format!("{:>width$} : {}\n", label, value, width = LABEL_WIDTH))
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample_summary() -> SummaryRecord {
        SummaryRecord {
            today_count: 2,
            days_recorded: 5,
            events_recorded: 21,
            min_per_day: 1,
            max_per_day: 9,
            average: 4.2,
            median: 3,
            midrange: 5.0,
            standard_deviation: 2.7129,
            min_delta: DeltaExtreme {
                delta: TimeDelta::minutes(12),
                closed_at: ts(2, 9, 15),
            },
            max_delta: DeltaExtreme {
                delta: TimeDelta::hours(25),
                closed_at: ts(3, 8, 0),
            },
            average_delta: TimeDelta::seconds(19_749) + TimeDelta::milliseconds(400),
            quiet_interval_count: 1,
        }
    }

    #[test]
    fn test_format_stat_rounding() {
        assert_eq!(format_stat(0.0), "0.00");
        assert_eq!(format_stat(2.5), "2.50");
        assert_eq!(format_stat(1.0 / 3.0), "0.33");
    }

    #[test]
    fn test_format_delta_truncates_fraction() {
        let d = TimeDelta::seconds(59) + TimeDelta::milliseconds(999);
        assert_eq!(format_delta(d), "0:00:59");
    }

    #[test]
    fn test_format_delta_zero() {
        assert_eq!(format_delta(TimeDelta::zero()), "0:00:00");
    }

    #[test]
    fn test_format_delta_extreme() {
        let extreme = DeltaExtreme {
            delta: TimeDelta::hours(25),
            closed_at: ts(2, 8, 0),
        };
        assert_eq!(
            format_delta_extreme(&extreme),
            "1 day, 1:00:00 on 2018-01-02 08:00"
        );
    }

    #[test]
    fn test_summary_fields_order() {
        let labels: Vec<&str> = summary_fields(&sample_summary())
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(labels.first(), Some(&"Today"));
        assert_eq!(labels.last(), Some(&"Quiet intervals"));
        assert_eq!(labels.len(), 13);
    }

    #[test]
    fn test_render_summary_right_aligns_labels() {
        let rendered = render_summary(&sample_summary());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "             Today : 2");
        assert_eq!(lines[3], "Min events per day : 1");
        assert_eq!(lines[6], "    Per day median : 3.00");
        assert_eq!(lines[8], "     Std deviation : 2.71");
        assert_eq!(lines[11], "     Average delta : 5:29:09");
        // Every separator sits in the same column.
        assert!(lines.iter().all(|l| &l[LABEL_WIDTH..LABEL_WIDTH + 3] == " : "));
    }
}
