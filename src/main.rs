//! kube-probe-lab entry point.
//!
//! Loads configuration, initializes tracing, draws the probe delays, sets up
//! the Axum router and serves until SIGINT/SIGTERM.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kube_probe_lab::config::{AppConfig, LoggingConfig, DEFAULT_LOG_FILTER};
use kube_probe_lab::http::start_server;
use kube_probe_lab::probes::{Probe, ProbeManager};
use kube_probe_lab::routes::create_router;
use kube_probe_lab::state::AppState;

/// kube-probe-lab: health probes that become ready after a random delay
#[derive(Parser, Debug)]
#[command(name = "kube-probe-lab", version, about)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "kube_probe_lab=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_tracing(log_level: Option<String>, logging: &LoggingConfig) {
    // Priority: CLI > env > default
    let log_filter = log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));

    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;

    init_tracing(args.log_level, &config.logging);
    tracing::info!(
        port = config.http.port,
        static_dir = %config.static_files.dir,
        version = %config.app.version,
        "Loaded configuration"
    );

    // All delays are drawn here, before any request can be served
    let probes = ProbeManager::new(config.probes.options());
    let bounds = probes.bounds();
    for probe in Probe::ALL {
        tracing::info!(
            probe = %probe,
            delay_seconds = probes.delay(probe),
            min = bounds.min_delay_seconds,
            max = bounds.max_delay_seconds,
            "Probe delay assigned"
        );
    }

    let state = AppState::new(config.clone(), probes);
    let app = create_router(state);

    if let Err(e) = start_server(app, &config.http).await {
        tracing::error!(error = %e, "Failed to start server");
        return Err(e.into());
    }

    Ok(())
}
