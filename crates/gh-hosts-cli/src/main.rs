//! gh-hosts - GitHub hosts over DNS-over-HTTPS
//!
//! Serves the current IPv4 addresses of GitHub domains as JSON and as a
//! hosts file, or queries them from the command line.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gh_hosts_cli::run().await
}
