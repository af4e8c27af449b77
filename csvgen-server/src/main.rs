//! CSV generator server: turns JSON tables into downloadable CSV files that
//! expire after the retention period.

mod request_log;
mod routes;
mod state;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use csvgen::config::{RetentionPolicy, ServiceConfig};
use csvgen::io::artifact_dir::FsArtifactDir;
use csvgen::io::clock::SystemClock;
use csvgen::sweeper::Sweeper;
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "csvgen-server")]
#[command(about = "Serve JSON-to-CSV generation with time-limited downloads")]
struct Args {
    /// Write every incoming request to LOG_DIR as a JSON file (only `true` enables it)
    #[arg(
        long,
        env = "DEBUG",
        action = ArgAction::Set,
        value_parser = parse_debug_flag,
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    debug: bool,

    /// Address to bind the server to
    #[arg(long, env = "BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 80)]
    port: u16,

    /// Public scheme and host used to build download URLs
    #[arg(long, env = "DOMAIN_NAME", default_value = "http://localhost")]
    domain_name: String,

    /// Directory for generated CSV files
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Directory for request logs written in debug mode
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Directory containing ai-plugin.json, openapi.yaml, logo.png and legal.txt
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Age in seconds after which a generated file is deleted
    #[arg(long, env = "RETENTION_SECS", default_value_t = 30 * 60)]
    retention_secs: u64,

    /// Seconds between expiry sweeps
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 30 * 60)]
    sweep_interval_secs: u64,
}

/// `DEBUG` is on only for the exact string `true`; any other value, including
/// `1` or an empty string, leaves it off.
fn parse_debug_flag(value: &str) -> Result<bool, Infallible> {
    Ok(value == "true")
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            port: self.port,
            domain_name: self.domain_name.clone(),
            upload_dir: self.upload_dir.clone(),
            log_dir: self.log_dir.clone(),
            static_dir: self.static_dir.clone(),
            debug: self.debug,
            retention: RetentionPolicy {
                max_age: Duration::from_secs(self.retention_secs),
                sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Values already in the environment take precedence over `.env`.
    let dotenv = dotenvy::dotenv();
    csvgen::logging::init("csvgen=info,csvgen_server=info");
    if let Err(err) = dotenv
        && !err.not_found()
    {
        warn!(error = %err, "ignoring unreadable .env file");
    }

    let args = Args::parse();
    let config = args.service_config();
    config.validate()?;
    info!(
        upload_dir = %config.upload_dir.display(),
        debug = config.debug,
        "starting csvgen-server"
    );

    let sweeper = Sweeper::new(
        Arc::new(FsArtifactDir::new(config.upload_dir.clone())),
        Arc::new(SystemClock),
        config.retention,
    );
    let sweeper_task = sweeper.spawn();

    let base_url = config.public_base_url();
    let app = routes::app(AppState::new(config.clone()));

    let addr: SocketAddr = format!("{}:{}", args.bind, config.port)
        .parse()
        .with_context(|| format!("parse bind address {}:{}", args.bind, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(addr = %addr, base_url = %base_url, "CSV generator listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper_task.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
