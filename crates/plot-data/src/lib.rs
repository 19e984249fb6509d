//! Data layer of the event plotter.
//!
//! Parses day-block event logs, groups events by day, derives count and gap
//! statistics, runs the top-level analysis pipeline and exports the chart
//! series for rendering.

pub mod aggregator;
pub mod analysis;
pub mod analyzer;
pub mod export;
pub mod reader;

pub use plot_core as core;
