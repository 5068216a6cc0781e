//! `gh-hosts hosts` - Print the hosts file.

use anyhow::Result;

use super::Context;
use crate::cli::args::HostsArgs;

pub async fn execute(ctx: Context, args: HostsArgs) -> Result<()> {
    let services = ctx.services().await?;
    let entries = services.cache.get_all_domains().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", services.formatter.render(&entries));
    }

    Ok(())
}
