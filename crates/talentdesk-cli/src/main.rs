//! talentdesk - a terminal client for the talentdesk recruitment backend.
//!
//! Signs in, keeps the session between runs, and prints jobs, dashboard
//! statistics and the routes the current account may open.

mod commands;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;
use talentdesk_core::auth::{AuthNotice, SessionHandle, SessionManager};
use talentdesk_core::{ApiClient, Config};

/// Log file name prefix; the appender adds the date.
const LOG_FILE_PREFIX: &str = "talentdesk.log";

/// Initialize the tracing subscriber for logging.
/// Returns the guard that flushes the log file on drop.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(filter)
        .init();
    guard
}

/// Print a notice whenever an authenticated request finds the session gone.
fn spawn_expiry_listener(session: &SessionHandle) {
    let mut notices = session.notices();
    tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(AuthNotice::SessionExpired) => {
                    eprintln!("Your session has expired. Run `talentdesk login` to sign in again.");
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, commands::USAGE);
            std::process::exit(2);
        }
    };
    if command == Command::Help {
        println!("{}", commands::USAGE);
        return Ok(());
    }

    let mut config = Config::load()?;
    let cache_dir = config.cache_dir()?;
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;

    let _log_guard = init_tracing(&cache_dir);
    info!("talentdesk starting");

    let session = SessionHandle::new(config.credential_store()?);
    let api_url = config.api_url();
    let api = ApiClient::connect(&api_url, session.clone())
        .with_context(|| format!("Failed to create API client for {}", api_url))?;
    let manager = SessionManager::new(api);

    spawn_expiry_listener(&session);
    manager.restore().await;

    let result = commands::run(command, &manager, &mut config).await;

    info!("talentdesk shutting down");
    result
}
