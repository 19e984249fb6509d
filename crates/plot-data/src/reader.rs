//! Day-block log parsing for the event plotter.
//!
//! The log stores one block per day, newest block first:
//!
//! ```text
//! 180917
//! # Comment (optional)
//! 0622 0835 1106 1219 1315 1506 1644
//!
//! ```
//!
//! Times on a line are written earliest first. The parser returns events and
//! comments in chronological order.

use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use plot_core::error::{PlotError, Result};
use plot_core::models::{Event, ParsedLog};
use plot_core::time_utils::{parse_date_token, parse_time_token};
use tracing::debug;

/// Marker that opens an optional comment line.
const COMMENT_MARKER: char = '#';

/// Number of leading characters of a date line that hold `YYMMDD`.
const DATE_WIDTH: usize = 6;

// ── Public API ────────────────────────────────────────────────────────────────

/// Open `path` and parse it as a day-block log.
///
/// The file handle is dropped before returning, on success or failure.
pub fn read_log_file(path: &Path) -> Result<ParsedLog> {
    let file = std::fs::File::open(path).map_err(|source| PlotError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_log(BufReader::new(file))?;

    debug!(
        "Parsed {} events over {} day-blocks from {}",
        parsed.total_events(),
        parsed.comments.len(),
        path.display()
    );

    Ok(parsed)
}

/// Parse a day-block log from any buffered reader.
///
/// Blocks must be strictly newest-first and the times on a line must not go
/// backwards; either violation would produce negative deltas downstream and
/// is reported as [`PlotError::MisorderedInput`].
pub fn parse_log<R: BufRead>(reader: R) -> Result<ParsedLog> {
    let mut lines = NumberedLines::new(reader);
    let mut blocks: Vec<DayBlock> = Vec::new();

    while let Some((line_no, line)) = lines.next_line()? {
        if line.trim().is_empty() {
            if lines.rest_is_blank()? {
                break;
            }
            return Err(PlotError::MalformedDate { line: line_no, token: line });
        }

        let block = read_block(&mut lines, line_no, &line)?;

        if let Some(newer) = blocks.last() {
            if block.date >= newer.date {
                return Err(PlotError::MisorderedInput {
                    line: block.line,
                    detail: format!(
                        "day-block {} is not older than day-block {} above it",
                        block.date, newer.date
                    ),
                });
            }
        }
        blocks.push(block);
    }

    debug!("Read {} day-blocks", blocks.len());

    // On disk the newest block comes first.
    blocks.reverse();

    let mut parsed = ParsedLog::default();
    for block in blocks {
        parsed
            .events
            .extend(block.times.iter().map(|&t| Event::new(block.date, t)));
        parsed.comments.push(block.comment);
    }

    Ok(parsed)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// One day of the log as written on disk.
#[derive(Debug)]
struct DayBlock {
    /// Line number of the date line.
    line: usize,
    date: NaiveDate,
    comment: String,
    times: Vec<NaiveTime>,
}

/// Read the rest of a block whose date line has already been consumed.
fn read_block<R: BufRead>(
    lines: &mut NumberedLines<R>,
    date_line_no: usize,
    date_line: &str,
) -> Result<DayBlock> {
    let token = date_line
        .get(..DATE_WIDTH)
        .ok_or_else(|| PlotError::MalformedDate {
            line: date_line_no,
            token: date_line.to_string(),
        })?;
    let date = parse_date_token(token, date_line_no)?;

    let missing_times = || PlotError::MalformedTime {
        line: date_line_no + 1,
        token: String::new(),
    };

    let (mut line_no, mut line) = lines.next_line()?.ok_or_else(missing_times)?;

    let comment = line
        .strip_prefix(COMMENT_MARKER)
        .map(|text| text.strip_prefix(' ').unwrap_or(text).to_string());
    if comment.is_some() {
        (line_no, line) = lines.next_line()?.ok_or_else(|| PlotError::MalformedTime {
            line: line_no + 1,
            token: String::new(),
        })?;
    }

    let times = parse_time_line(&line, line_no)?;

    // The blank separator is optional at end of input, and a missing one
    // leaves the next date line in place.
    lines.skip_blank()?;

    Ok(DayBlock {
        line: date_line_no,
        date,
        comment: comment.unwrap_or_default(),
        times,
    })
}

/// Parse a space-separated list of `HHMM` tokens, earliest first.
fn parse_time_line(line: &str, line_no: usize) -> Result<Vec<NaiveTime>> {
    let times = line
        .split(' ')
        .map(|token| parse_time_token(token, line_no))
        .collect::<Result<Vec<_>>>()?;

    if let Some(pair) = times.windows(2).find(|pair| pair[1] < pair[0]) {
        return Err(PlotError::MisorderedInput {
            line: line_no,
            detail: format!(
                "{} follows {} on the same day",
                pair[1].format("%H%M"),
                pair[0].format("%H%M")
            ),
        });
    }

    Ok(times)
}

/// Line reader that tracks 1-based line numbers and allows one line of
/// look-ahead.
struct NumberedLines<R> {
    inner: Lines<R>,
    line_no: usize,
    peeked: Option<(usize, String)>,
}

impl<R: BufRead> NumberedLines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            line_no: 0,
            peeked: None,
        }
    }

    fn next_line(&mut self) -> Result<Option<(usize, String)>> {
        if let Some(peeked) = self.peeked.take() {
            return Ok(Some(peeked));
        }
        match self.inner.next() {
            Some(line) => {
                self.line_no += 1;
                let line = line.map_err(|source| PlotError::LineRead {
                    line: self.line_no,
                    source,
                })?;
                Ok(Some((self.line_no, line)))
            }
            None => Ok(None),
        }
    }

    /// Consume the next line if it is blank; otherwise leave it for the
    /// following `next_line` call.
    fn skip_blank(&mut self) -> Result<()> {
        if let Some((line_no, line)) = self.next_line()? {
            if !line.trim().is_empty() {
                self.peeked = Some((line_no, line));
            }
        }
        Ok(())
    }

    /// Drain the remaining input, reporting whether all of it was blank.
    fn rest_is_blank(&mut self) -> Result<bool> {
        while let Some((_, line)) = self.next_line()? {
            if !line.trim().is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
