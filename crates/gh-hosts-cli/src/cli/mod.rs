//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::{Context as _, Result};
use args::{Cli, Commands};
use clap::Parser;
use gh_hosts_srv::ServerConfig;
use std::path::Path;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }
    if cli.memory {
        config.store.memory = true;
    }

    crate::telemetry::init(&config.log_level, cli.verbose);

    let ctx = commands::Context {
        config,
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(ctx, args).await,
        Commands::Resolve(args) => commands::resolve::execute(ctx, args).await,
        Commands::Hosts(args) => commands::hosts::execute(ctx, args).await,
        Commands::Lookup(args) => commands::lookup::execute(ctx, args).await,
        Commands::Reset => commands::reset::execute(ctx).await,
        Commands::Providers => commands::providers::execute(ctx),
    }
}

/// Load the explicit config file, else the default one if present, else
/// built-in defaults.
fn load_config(explicit: Option<&Path>) -> Result<ServerConfig> {
    if let Some(path) = explicit {
        anyhow::ensure!(path.exists(), "config file not found: {}", path.display());
        return ServerConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }

    match ServerConfig::default_path() {
        Some(path) => ServerConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}
