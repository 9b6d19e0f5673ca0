// Player valuation entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load config
// 3. Resolve the next unplayed gameweek
// 4. Load filtered teams, fixtures and players
// 5. Run the valuation pipeline
// 6. Write ranked players, teams and league stats

use fpl_valuation::config;
use fpl_valuation::data;
use fpl_valuation::gameweek;
use fpl_valuation::valuation::{self, PipelineContext};

use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Starting data processing...");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: current season {}, {} seasons tracked, data dir {}",
        config.seasons.current,
        config.seasons.all.len(),
        config.data.dir
    );

    // 3. Resolve the next gameweek
    let next_gameweek = gameweek::resolve_next_gameweek(&config.gameweek)
        .context("failed to determine the next gameweek")?;
    info!("Next gameweek: {}", next_gameweek);
    if next_gameweek <= 1 {
        warn!("The season hasn't started yet. Some calculations may not be meaningful.");
    }
    let ctx = PipelineContext::from_config(&config, next_gameweek);

    // 4. Load inputs
    let data_dir = Path::new(&config.data.dir);
    let input = data::load_inputs(data_dir).context("failed to load filtered input data")?;

    // 5. Run the pipeline
    let report = valuation::run_pipeline(&input, &ctx).context("valuation pipeline failed")?;

    // 6. Persist
    info!("Saving final data...");
    data::write_outputs(data_dir, &report).context("failed to write output files")?;

    info!("Data processing completed successfully.");
    Ok(())
}

/// Initialize tracing to log to stderr so stdout stays clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fpl_valuation=info,fpl_value=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
