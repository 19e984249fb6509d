//! JSON export of the chart series for an external renderer.

use std::path::Path;

use plot_core::error::Result;
use plot_core::models::Analysis;
use tracing::debug;

/// Atomically write `analysis` (summary and chart series) as pretty JSON,
/// creating parent directories if needed.
pub fn write_series(path: &Path, analysis: &Analysis) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(analysis)?;

    // Write to a temp file then rename for atomicity.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json)?;
    std::fs::rename(&tmp, path)?;

    debug!("Wrote {} bytes of chart series to {}", json.len(), path.display());
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
