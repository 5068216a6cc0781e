//! `gh-hosts lookup` - Single-domain cache lookup.

use anyhow::{bail, Result};
use gh_hosts_core::canonical;

use super::Context;
use crate::cli::args::LookupArgs;

pub async fn execute(ctx: Context, args: LookupArgs) -> Result<()> {
    let services = ctx.services().await?;

    let Some(domain) = canonical(services.cache.domains(), &args.domain) else {
        bail!(
            "{} is not on the allow-list; see `gh-hosts hosts` for the served domains",
            args.domain
        );
    };

    match services.cache.get_domain(domain).await {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        None => bail!("failed to resolve {domain}"),
    }
}
