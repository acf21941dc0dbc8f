use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use skywatch::{Engine, LogFormat, Poller, Settings, SystemClock};
use skywatch_feeds::http::HttpFeeds;

#[derive(Parser, Debug)]
#[command(name = "skywatch")]
#[command(about = "Polling dashboard engine for drone video streams, telemetry, events and liveness")]
struct Args {
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the dashboard API (e.g. "http://localhost:8000/api")
    #[arg(long)]
    base_url: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "skywatch=trace")
    #[arg(long)]
    log_level: Option<String>,

    /// Poll every feed once, write the dashboard state to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Seconds between dashboard summary log lines
    #[arg(long, default_value = "30")]
    summary_every: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    if let Some(base_url) = args.base_url {
        settings.feeds.base_url = base_url;
    }
    if let Some(level) = args.log_level {
        settings.logging.level = level;
    }
    settings.validate()?;

    init_logging(&settings);

    let feeds = HttpFeeds::builder()
        .base_url(settings.feeds.base_url.clone())
        .timeout(settings.request_timeout())
        .build()?;
    info!(base_url = %feeds.base_url(), ordering = ?settings.feeds.ordering, "starting skywatch");

    let engine = Engine::new(Arc::new(SystemClock), settings.engine_options());
    let poller = Arc::new(Poller::new(Arc::new(feeds), engine, settings.feeds.ordering));

    // Handle export mode (one pass, non-interactive)
    if let Some(export_path) = args.export {
        return export_to_file(&poller, &export_path).await;
    }

    let summary_every = Duration::from_secs(args.summary_every.max(1));
    run(poller, &settings, summary_every).await
}

fn init_logging(settings: &Settings) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    match settings.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

/// Poll until Ctrl-C, logging a dashboard summary periodically.
async fn run(poller: Arc<Poller>, settings: &Settings, summary_every: Duration) -> Result<()> {
    let handle = poller.spawn(&settings.schedule());

    let mut summary_timer = tokio::time::interval(summary_every);
    // First tick completes immediately; skip it so the feeds get a chance to land.
    summary_timer.tick().await;

    loop {
        tokio::select! {
            _ = summary_timer.tick() => {
                let view = poller.view();
                info!("{}", view.summary());
                if let Some(banner) = view.error_banner() {
                    debug!(%banner, "feed errors");
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                info!("shutting down");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

async fn export_to_file(poller: &Poller, export_path: &Path) -> Result<()> {
    for (feed, outcome) in poller.tick_all().await {
        debug!(%feed, ?outcome, "export fetch");
    }

    let view = poller.view();

    let export = serde_json::json!({
        "summary": {
            "streams": view.streams.len(),
            "active_streams": view.active_streams(),
            "tracked_entities": view.trajectories.len(),
            "health": view.health,
            "failing_feeds": view.errors.keys().collect::<Vec<_>>(),
        },
        "dashboard": view,
    });

    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(export_path, json)
        .with_context(|| format!("failed to write {}", export_path.display()))?;

    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}
