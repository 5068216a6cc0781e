//! `gh-hosts resolve` - One-off DoH lookup.

use anyhow::{Context as _, Result};

use super::Context;
use crate::cli::args::ResolveArgs;

pub async fn execute(ctx: Context, args: ResolveArgs) -> Result<()> {
    let client = ctx
        .config
        .resolver
        .client()
        .context("failed to build resolver")?;

    let provider = client.provider(args.provider.as_deref()).name.clone();
    let ip = client
        .lookup(&args.domain, Some(&provider))
        .await
        .with_context(|| format!("no A record for {} via {provider}", args.domain))?;

    println!("{}", ctx.highlight(&ip.to_string()));
    Ok(())
}
