//! `gh-hosts reset` - Purge and rebuild the snapshot.

use anyhow::Result;

use super::Context;

pub async fn execute(ctx: Context) -> Result<()> {
    let services = ctx.services().await?;
    let entries = services.cache.reset().await;

    println!(
        "Reset completed: {} of {} domains resolved",
        ctx.highlight(&entries.len().to_string()),
        services.cache.domains().len()
    );
    Ok(())
}
