//! Shared building blocks for the event plotter.
//!
//! Models of the parsed log and its statistics, the error type, CLI and
//! config-file settings, and time/formatting helpers used by `plot-data`
//! and the `event-plot` binary.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
