//! Twitch Channel Point Farmer.
//!
//! Runs first-time setup if needed, then watches the configured streamers
//! until interrupted.

use clap::Parser;

use point_farmer_lib::cli::Cli;
use point_farmer_lib::config::defaults::LOGS_DIR;
use point_farmer_lib::logging;
use point_farmer_lib::setup::{SetupOutcome, Wizard};
use point_farmer_lib::streamers::read_streamers;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Step 1: Data directory and logging
    let dir = point_farmer_lib::data_dir(cli.data_dir.clone());
    std::fs::create_dir_all(&dir)?;
    let _log_guard = logging::init(&dir.join(LOGS_DIR))?;
    tracing::info!(
        "Starting Twitch Channel Point Farmer {}",
        env!("CARGO_PKG_VERSION")
    );

    // Step 2: First-time setup
    let outcome = Wizard::new(
        dir.clone(),
        cli.skip_intro,
        std::io::stdin().lock(),
        std::io::stdout(),
    )
    .run()?;
    if let SetupOutcome::Restart(reason) = outcome {
        tracing::info!("Setup paused: {reason}. Restart when ready.");
        return Ok(());
    }

    // Step 3: Foundation (fatal on error)
    let foundation = point_farmer_lib::init_foundation(&dir)?;
    let mut farmer = point_farmer_lib::build_loop(&foundation).await;

    // Step 4: Loop until interrupted
    if cli.once {
        farmer.tick(&read_streamers(&foundation.list_path)).await;
    } else {
        tokio::select! {
            _ = farmer.run(&foundation.list_path) => {}
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!("Failed to listen for Ctrl-C: {e}");
                }
                tracing::info!("Interrupted, shutting down");
            }
        }
    }

    farmer.browser_mut().shutdown().await;
    tracing::info!("Goodbye!");
    Ok(())
}
