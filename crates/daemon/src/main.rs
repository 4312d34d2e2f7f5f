// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event Scheduler Daemon (ezd)
//!
//! Foreground process that owns one schedule and its timers.

use std::path::PathBuf;

use clap::Parser;
use ez_daemon::{lifecycle, protocol, Config, LifecycleError};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "ezd", version, about = "On/off and trigger event scheduler")]
struct Args {
    /// Timer configuration file (TOML)
    #[arg(long, short)]
    config: PathBuf,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config {
        config_path: args.config,
        log_path: args.log_file,
    };

    // Set up logging
    let log_guard = setup_logging(&config)?;

    info!("Starting ezd with {}", config.config_path.display());

    // Start daemon
    let mut daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            eprintln!("ezd: failed to start: {}", e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let mut input = protocol::spawn_reader(std::io::BufReader::new(std::io::stdin()));

    info!("Daemon ready");

    // Main event loop
    loop {
        let wait = daemon.next_wait();

        tokio::select! {
            // Commands from stdin
            line = input.recv() => {
                let Some(line) = line else {
                    info!("Input closed, shutting down...");
                    daemon.shutdown().await?;
                    break;
                };
                if let Err(e) = daemon.handle_line(&line).await {
                    error!("Error handling input: {}", e);
                }
            }

            // Next timer deadline
            _ = tokio::time::sleep(wait) => {
                if let Err(e) = daemon.check_timers().await {
                    error!("Error firing timers: {}", e);
                }
            }

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                daemon.shutdown().await?;
                break;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                daemon.shutdown().await?;
                break;
            }
        }
    }

    info!("Daemon stopped");
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries protocol output, so logs go to a file or stderr
    let (writer, guard) = match &config.log_path {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let file_name = path
                .file_name()
                .ok_or_else(|| LifecycleError::InvalidLogPath(path.clone()))?;
            std::fs::create_dir_all(&dir)?;
            let file_appender = tracing_appender::rolling::never(dir, file_name);
            tracing_appender::non_blocking(file_appender)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}
