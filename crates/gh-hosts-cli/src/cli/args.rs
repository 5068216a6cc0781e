//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// GitHub hosts over DNS-over-HTTPS
///
/// Resolves GitHub domains through public DoH providers, caches the answers
/// and serves them as JSON or as a ready-to-append hosts file.
#[derive(Parser, Debug)]
#[command(name = "gh-hosts")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: <config dir>/gh-hosts/config.toml)
    #[arg(short, long, global = true, env = "GH_HOSTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Admin key for reset (overrides the config file)
    #[arg(short = 'k', long, global = true, env = "GH_HOSTS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Keep the cache in memory instead of the store file
    #[arg(long, global = true)]
    pub memory: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service and the refresh scheduler
    Serve(ServeArgs),

    /// Resolve one domain over DoH, bypassing the cache
    Resolve(ResolveArgs),

    /// Print the hosts file for all domains
    Hosts(HostsArgs),

    /// Look up one domain through the cache
    Lookup(LookupArgs),

    /// Purge and rebuild the cached snapshot
    Reset,

    /// List configured DoH providers
    Providers,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (overrides the config file)
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Domain to resolve
    pub domain: String,

    /// Provider name (default: the first configured)
    #[arg(short, long)]
    pub provider: Option<String>,
}

#[derive(Args, Debug)]
pub struct HostsArgs {
    /// Print `[ip, domain]` pairs as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Domain to look up; must be on the allow-list
    pub domain: String,
}
