//! autobackup CLI - watch one file and keep timestamped backups of it

use anyhow::{Context, Result};
use backup_core::{Policy, StdFileOps};
use clap::Parser;
use owo_colors::OwoColorize;
use retention::BackupRetentionController;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
mod config;
mod console;

use args::Cli;
use console::ConsoleSink;

#[tokio::main]
async fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    if args::wants_help(&raw) {
        print!("{}", args::usage());
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprint!("{e}");
            print!("{}", args::usage());
            return ExitCode::FAILURE;
        }
    };

    if !args::file_is_first(&raw, &cli) {
        eprintln!("Invalid file path. The first argument must be a valid path to an existing file.");
        print!("{}", args::usage());
        return ExitCode::FAILURE;
    }

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n{} {e:#}\n", "ERROR:".red());
            println!("Exiting\n");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

/// Validate arguments, watch until asked to stop
async fn run(cli: Cli) -> Result<ExitCode> {
    if !cli.file.is_file() {
        eprintln!("Invalid file path. The first argument must be a valid path to an existing file.");
        print!("{}", args::usage());
        return Ok(ExitCode::FAILURE);
    }

    let config = config::load(cli.config.as_deref())?;
    let max_backups = cli.max_backups.unwrap_or(config.policy.max_backups);
    let minutes = cli.minutes.unwrap_or(config.policy.min_interval_minutes);

    if let Err(e) = Policy::new(max_backups, minutes) {
        eprintln!("{e}");
        print!("{}", args::usage());
        return Ok(ExitCode::FAILURE);
    }

    let controller = BackupRetentionController::with_options(
        Arc::new(StdFileOps),
        Arc::new(ConsoleSink::new()),
        config.controller_options(),
    );
    controller
        .start(&cli.file, max_backups, minutes)
        .with_context(|| format!("Could not watch {}", cli.file.display()))?;

    println!("\nPress enter to stop watching file.\n");
    wait_for_stop().await;

    if let Some(status) = controller.status() {
        tracing::debug!("Stopping with {} backup(s) on hand", status.backups.len());
    }
    controller.stop()?;
    println!("Exiting\n");
    Ok(ExitCode::SUCCESS)
}

/// Resolve on Enter, end of stdin, or Ctrl-C
async fn wait_for_stop() {
    let (tx, rx) = oneshot::channel();

    // Blocking read on a detached thread; the runtime never waits on it
    let spawned = std::thread::Builder::new()
        .name("autobackup-stdin".to_string())
        .spawn(move || {
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);
            let _ = tx.send(());
        });
    let stdin_closed = async {
        match spawned {
            Ok(_) => {
                let _ = rx.await;
            }
            Err(e) => {
                tracing::warn!("Could not read stdin ({e}); stop with Ctrl-C");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = stdin_closed => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!("Could not listen for Ctrl-C: {e}");
            }
        }
    }
}
