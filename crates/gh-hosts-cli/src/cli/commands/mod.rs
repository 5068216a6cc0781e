//! Command implementations.

pub mod hosts;
pub mod lookup;
pub mod providers;
pub mod reset;
pub mod resolve;
pub mod serve;

use anyhow::{Context as _, Result};
use colored::Colorize;
use gh_hosts_srv::{ServerConfig, Services};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective configuration, CLI overrides applied
    pub config: ServerConfig,

    /// Disable colors
    pub no_color: bool,
}

impl Context {
    /// Open the store and build the cache exactly as the server does.
    pub async fn services(&self) -> Result<Services> {
        Services::from_config(&self.config)
            .await
            .context("failed to initialize services")
    }

    /// Highlight a value unless colors are off.
    pub fn highlight(&self, value: &str) -> String {
        if self.no_color {
            value.to_string()
        } else {
            value.cyan().bold().to_string()
        }
    }
}
