use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use station_monitor::config::load_config;
use station_monitor::refresher::{Refresher, RefresherSettings};
use station_monitor::render::LogRenderer;
use station_monitor::version::VERSION;
use station_monitor::HttpDataSource;

#[derive(Parser, Debug)]
#[command(name = "monitor", version = VERSION, about = "Pumping-station dashboard refresher")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "monitor_config.toml")]
    config: String,
}

fn init_logging() {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily("logs", "monitor.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info` level if RUST_LOG is not set.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging();
    info!(version = VERSION, "Starting station monitor...");

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Critical error loading configuration. Exiting.");
            return Err(e.into());
        }
    };

    let source = HttpDataSource::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_seconds),
    )?;
    let refresher = Refresher::new(RefresherSettings::from(&config), source, LogRenderer);

    let period = Duration::from_secs(config.refresh_interval_seconds.max(1));
    info!(
        interval_seconds = period.as_secs(),
        station_id = config.station_id,
        "Refresh loop starting."
    );
    let handle = refresher.start(period);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Stopping refresh loop.");

    match handle.stop().await {
        Ok(refresher) => {
            info!(
                history_samples = refresher.history().len(),
                active_alerts = refresher.alerts().len(),
                "Refresh loop stopped cleanly."
            );
        }
        Err(e) => {
            error!(error = %e, "Refresh task ended abnormally.");
        }
    }

    Ok(())
}
