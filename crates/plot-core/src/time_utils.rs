use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::error::{PlotError, Result};

/// Minutes in one full day, the denominator of the normalized time axis.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

// ── Log tokens ────────────────────────────────────────────────────────────────

/// Parse a `YYMMDD` date token.
///
/// Two-digit years follow the POSIX `%y` pivot: `00`–`68` map to 2000–2068
/// and `69`–`99` to 1969–1999. `line` is only used for error reporting.
pub fn parse_date_token(token: &str, line: usize) -> Result<NaiveDate> {
    let malformed = || PlotError::MalformedDate {
        line,
        token: token.to_string(),
    };

    let digits = fixed_digits(token, 6).ok_or_else(malformed)?;
    let yy = digits[0] * 10 + digits[1];
    let month = digits[2] * 10 + digits[3];
    let day = digits[4] * 10 + digits[5];
    let year = if yy < 69 { 2000 + yy } else { 1900 + yy };

    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(malformed)
}

/// Parse a strict four-digit `HHMM` time token.
pub fn parse_time_token(token: &str, line: usize) -> Result<NaiveTime> {
    let malformed = || PlotError::MalformedTime {
        line,
        token: token.to_string(),
    };

    let digits = fixed_digits(token, 4).ok_or_else(malformed)?;
    let hour = digits[0] * 10 + digits[1];
    let minute = digits[2] * 10 + digits[3];

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(malformed)
}

/// Split `token` into exactly `len` decimal digits.
fn fixed_digits(token: &str, len: usize) -> Option<Vec<u32>> {
    if token.len() != len {
        return None;
    }
    token.chars().map(|c| c.to_digit(10)).collect()
}

// ── Clock values ──────────────────────────────────────────────────────────────

/// Parse an `HH:MM` clock value, as accepted on the command line.
///
/// Returns a `String` error so it can be plugged into a clap value parser.
pub fn parse_clock(s: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| format!("invalid clock time \"{}\" (expected HH:MM): {}", s, e))
}

/// Minutes elapsed since midnight.
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Position of `time` on a 24-hour cycle scaled to `[0.0, 1.0)`.
///
/// Midnight is `0.0`, noon is `0.5`.
pub fn normalized_time_of_day(time: NaiveTime) -> f64 {
    f64::from(minutes_since_midnight(time)) / f64::from(MINUTES_PER_DAY)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
