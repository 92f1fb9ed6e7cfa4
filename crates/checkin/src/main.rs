// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checkin - post-visit check-in outreach engine.
//!
//! This is the binary entry point.

mod app;
mod commands;
mod serve;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use checkin_config::CheckinConfig;
use checkin_core::{CheckinError, Day};

use crate::app::App;

/// Checkin - post-visit check-in outreach engine.
#[derive(Parser, Debug)]
#[command(name = "checkin", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log deliveries for channels that have no configured transport.
    #[arg(long, global = true)]
    log_transport: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the periodic dispatcher and the HTTP gateway.
    Serve,
    /// Process one batch of due items.
    Dispatch {
        /// Maximum items to process (defaults to dispatch.batch_limit).
        #[arg(long)]
        limit: Option<u32>,
        /// Resolve content but mark items skipped instead of sending.
        #[arg(long)]
        dry_run: bool,
    },
    /// Create the check-in chain for a subject.
    Enqueue {
        subject_id: String,
    },
    /// Verify a response token and record the response.
    Verify {
        token: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Render the message a subject would receive on a given day.
    Preview {
        subject_id: String,
        #[arg(value_parser = parse_day)]
        day: Day,
    },
    /// Show storage health and queue counts.
    Status,
    /// Reset a failed queue item to queued.
    Requeue {
        id: i64,
    },
}

fn parse_day(value: &str) -> Result<Day, String> {
    value
        .parse::<u32>()
        .map_err(|e| e.to_string())
        .and_then(Day::try_from)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => checkin_config::load_and_validate_path(path),
        None => checkin_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            checkin_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.service.log_level);

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: CheckinConfig) -> Result<ExitCode, CheckinError> {
    let app = App::open(config, cli.log_transport).await?;
    let mut code = ExitCode::SUCCESS;

    match cli.command {
        Commands::Serve => {
            serve::run_serve(app).await?;
            return Ok(code);
        }
        Commands::Dispatch { limit, dry_run } => {
            print_json(&commands::dispatch(&app, limit, dry_run).await?)?
        }
        Commands::Enqueue { subject_id } => {
            print_json(&commands::enqueue(&app, &subject_id).await?)?
        }
        Commands::Verify { token, note } => {
            let report = commands::verify(&app, &token, note.as_deref()).await?;
            print_json(&report)?;
            if matches!(report, commands::VerifyReport::Invalid) {
                code = ExitCode::FAILURE;
            }
        }
        Commands::Preview { subject_id, day } => {
            print_json(&commands::preview(&app, &subject_id, day).await?)?
        }
        Commands::Status => print_json(&commands::status(&app).await?)?,
        Commands::Requeue { id } => print_json(&commands::requeue(&app, id).await?)?,
    }

    app.shutdown().await?;
    Ok(code)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CheckinError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CheckinError::Internal(format!("failed to serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("checkin={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
