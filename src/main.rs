mod board;
mod db;
mod directory;
mod ipc;
mod roll;
mod roster;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "HOMEBOARDD_LOG";

/// Home board sidecar: JSON requests on stdin, one JSON response per line on stdout.
#[derive(Debug, Parser)]
#[command(name = "homeboardd", version, about)]
struct Args {
    /// Workspace folder to open at startup (same as `workspace.select`).
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Log filter used when HOMEBOARDD_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    // stdout carries responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut state = ipc::AppState::default();
    if let Some(path) = args.workspace {
        ipc::select_workspace(&mut state, path)?;
    }
    info!(version = env!("CARGO_PKG_VERSION"), "homeboardd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                // Can't reply with an id.
                warn!(error = %e, "bad request line");
                ipc::bad_json(e.to_string())
            }
        };

        writeln!(stdout, "{}", resp)?;
        stdout.flush()?;
    }

    info!("stdin closed; exiting");
    Ok(())
}
