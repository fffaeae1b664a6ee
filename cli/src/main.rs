// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # AEGIS Datasource CLI
//!
//! The `aegis-datasource` binary is the composition root for the datasource
//! guard: it loads the manifest, decides at startup whether a pool is built
//! at all, and serves a small status surface over HTTP.
//!
//! ## Commands
//!
//! - `aegis-datasource serve` - build the datasource and serve status endpoints
//! - `aegis-datasource config show|validate|generate` - configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::ConfigCommand;

/// AEGIS Datasource - guarded connection pool service
#[derive(Parser)]
#[command(name = "aegis-datasource")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AEGIS_DATASOURCE_CONFIG",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AEGIS_DATASOURCE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the datasource and serve the status API
    #[command(name = "serve")]
    Serve {
        /// Status API host
        #[arg(long, env = "AEGIS_DATASOURCE_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Status API port
        #[arg(long, env = "AEGIS_DATASOURCE_PORT", default_value = "8000")]
        port: u16,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Serve { host, port } => commands::serve::run(cli.config, &host, port).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
