mod bootstrap;

use anyhow::{Context, Result};
use plot_core::formatting::render_summary;
use plot_core::settings::Settings;
use plot_data::analysis::analyze_file;
use plot_data::export::write_series;

fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("event-plot v{} starting", env!("CARGO_PKG_VERSION"));

    let report = run(&settings)?;
    print!("{}", report);

    Ok(())
}

/// Analyse the configured log, export the series if requested and return the
/// rendered summary. Nothing is printed unless every step succeeds.
fn run(settings: &Settings) -> Result<String> {
    let config = settings.analysis_config()?;
    tracing::debug!("Analysis config: {:?}", config);

    let analysis = analyze_file(&settings.data_file, &config)
        .with_context(|| format!("failed to analyse {}", settings.data_file.display()))?;

    if let Some(path) = &settings.export {
        write_series(path, &analysis)
            .with_context(|| format!("failed to export chart series to {}", path.display()))?;
        tracing::info!("Chart series written to {}", path.display());
    }

    Ok(render_summary(&analysis.summary))
}
