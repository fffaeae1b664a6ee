// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use aegis_datasource_core::domain::config::DatasourceManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./datasource-config.yaml)
        #[arg(short, long, default_value = "./datasource-config.yaml")]
        output: PathBuf,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output } => generate(output).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let manifest = DatasourceManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. AEGIS_DATASOURCE_CONFIG: {}",
            std::env::var("AEGIS_DATASOURCE_CONFIG")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./datasource-config.yaml");
        println!("  4. ~/.aegis/datasource.yaml");
        println!("  5. /etc/aegis/datasource.yaml");
        println!();
    }

    let ds = &manifest.datasource;

    println!("{}", "Datasource:".bold());
    println!("  Enabled: {}", ds.enabled);
    println!("  Pool name: {}", ds.pool_name);
    // Credentials stay out of terminal output
    println!("  Connection URL: {}", ds.masked_url());
    println!("  User: {}", ds.user_name);
    println!("  Schema: {}", ds.schema().unwrap_or("(none)"));
    println!();

    println!("{}", "Pool limits:".bold());
    println!(
        "  min / initial / max: {} / {} / {}",
        ds.min_connections, ds.initial_connections, ds.max_connections
    );
    println!();

    println!("{}", "Timeouts (seconds):".bold());
    println!("  Inactivity: {}", ds.inactivity_timeout_secs);
    println!("  Time to live: {}", ds.time_to_live_secs);
    println!("  Connection wait: {}", ds.connection_wait_timeout_secs);
    println!("  Abandoned: {}", ds.abandoned_timeout_secs);
    println!("  Property check interval: {}", ds.property_check_interval_secs);

    if let Some(ons) = ds.notification_service() {
        println!();
        println!("{}", "Notification service:".bold());
        println!("  {}", ons);
    }

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let manifest = DatasourceManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    manifest
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf) -> Result<()> {
    let sample = DatasourceManifest::sample();
    sample
        .to_yaml_file(&output)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generated_sample_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datasource-config.yaml");

        generate(path.clone()).await.unwrap();

        let manifest = DatasourceManifest::from_yaml_file(&path).unwrap();
        assert!(manifest.datasource.enabled);
        manifest.validate().unwrap();
    }
}
