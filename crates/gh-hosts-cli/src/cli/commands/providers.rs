//! `gh-hosts providers` - List DoH providers.

use anyhow::Result;

use super::Context;

#[allow(clippy::needless_pass_by_value)]
pub fn execute(ctx: Context) -> Result<()> {
    for (index, provider) in ctx.config.resolver.providers.iter().enumerate() {
        let marker = if index == 0 { " (default)" } else { "" };
        println!("{}\t{}{marker}", ctx.highlight(&provider.name), provider.url);
    }
    Ok(())
}
