//! `gh-hosts serve` - Run the HTTP service.

use anyhow::{Context as _, Result};
use tracing::warn;

use super::Context;
use crate::cli::args::ServeArgs;

pub async fn execute(mut ctx: Context, args: ServeArgs) -> Result<()> {
    if let Some(listen) = args.listen {
        ctx.config.listen = listen;
    }
    if ctx.config.api_key.is_none() {
        warn!("no api_key configured, POST /reset is disabled");
    }

    gh_hosts_srv::server::run(&ctx.config)
        .await
        .context("server failed")
}
