// Tableshuttle - SQL Server to Azure Blob Storage table mover
// Copyright (c) 2025 Tableshuttle Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use tableshuttle::cli::{exit_codes, Cli, Commands};
use tableshuttle::config::load_config;
use tableshuttle::logging::{init_logging, run_span, RunLog};
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // --log-level wins over the configured level
    let log_level = match &cli.log_level {
        Some(level) => level.clone(),
        None => load_config(&cli.config)
            .map(|c| c.application.log_level)
            .unwrap_or_else(|_| "info".to_string()),
    };

    // Only data-moving commands get a per-run log file
    let run_log = cli
        .direction()
        .map(|direction| RunLog::new(&cli.log_dir, direction));

    let logging_guard = match init_logging(&log_level, run_log.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(exit_codes::FATAL);
        }
    };

    // Every record of a data-moving command carries the run id
    let span = cli
        .direction()
        .map(run_span)
        .unwrap_or_else(tracing::Span::none);

    span.in_scope(|| {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            "Tableshuttle - SQL Server to Azure Blob Storage table mover"
        );
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let signal_task = async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SIGTERM handler");
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                        let _ = shutdown_tx.send(true);
                    }
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                    eprintln!("\nShutdown signal received, stopping...");
                    let _ = shutdown_tx.send(true);
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating shutdown...");
                    eprintln!("\nShutdown signal received, stopping...");
                    let _ = shutdown_tx.send(true);
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                eprintln!("\nShutdown signal received, stopping...");
                let _ = shutdown_tx.send(true);
            }
        }
    };
    tokio::spawn(signal_task.instrument(span.clone()));

    let exit_code = match execute_command(&cli, shutdown_rx)
        .instrument(span.clone())
        .await
    {
        Ok(code) => code,
        Err(e) => {
            span.in_scope(|| tracing::error!(error = %e, "Command execution failed"));
            eprintln!("Error: {e}");
            exit_codes::FATAL
        }
    };

    if let Some(path) = logging_guard.log_file() {
        span.in_scope(|| {
            tracing::info!(log_file = %path.display(), exit_code, "Run finished");
        });
    }
    drop(span);

    // process::exit skips destructors; flush the file writer first
    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Import(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
