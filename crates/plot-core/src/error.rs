use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the event plotter.
#[derive(Error, Debug)]
pub enum PlotError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of the log could not be read, e.g. it is not valid UTF-8.
    #[error("Failed to read line {line}: {source}")]
    LineRead {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// A day-block date line is not six digits forming a calendar date.
    #[error("Malformed date on line {line}: {token:?}")]
    MalformedDate { line: usize, token: String },

    /// A time token is not a four-digit `HHMM` value between 0000 and 2359.
    #[error("Malformed time on line {line}: {token:?}")]
    MalformedTime { line: usize, token: String },

    /// Blocks or times are not in the order the log format requires.
    #[error("Misordered input on line {line}: {detail}")]
    MisorderedInput { line: usize, detail: String },

    /// Too few events or days for the requested statistic.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A statistic is undefined for the given input.
    #[error("Degenerate data: {0}")]
    DegenerateData(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed or written.
    #[error("Failed to process JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the plot crates.
pub type Result<T> = std::result::Result<T, PlotError>;
