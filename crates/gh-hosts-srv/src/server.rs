//! Service wiring and the HTTP server runner.

use gh_hosts_client::ResolverClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::cache::DomainCache;
use crate::config::ServerConfig;
use crate::hosts_file::HostsFormatter;
use crate::http::{self, AppState, Limiters};
use crate::scheduler::Scheduler;
use crate::store::{MemoryStore, RedbStore, Store};

/// Everything a running instance shares, built once from config.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn Store>,
    pub resolver: ResolverClient,
    pub cache: Arc<DomainCache>,
    pub formatter: Arc<HostsFormatter>,
}

impl Services {
    /// Open the store and build the resolver, cache and formatter.
    pub async fn from_config(config: &ServerConfig) -> crate::Result<Self> {
        let store = open_store(config).await?;

        let resolver = config.resolver.client()?;
        info!(
            providers = resolver.providers().len(),
            throttled = resolver.is_throttled(),
            "resolver ready"
        );

        let cache = DomainCache::new(
            Arc::clone(&store),
            Arc::new(resolver.clone()),
            config.resolver.batch_config(),
            config.hosts.domains.clone(),
            config.cache.freshness(),
        );

        let formatter = HostsFormatter::new(config.hosts.template.clone(), config.hosts.utc_offset_hours)?;

        Ok(Self {
            store,
            resolver,
            cache: Arc::new(cache),
            formatter: Arc::new(formatter),
        })
    }
}

async fn open_store(config: &ServerConfig) -> crate::Result<Arc<dyn Store>> {
    if config.store.memory {
        info!("using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let path = config
        .store_path()
        .ok_or_else(|| crate::SrvError::Config("no data directory for the store; set store.path".into()))?;
    Ok(Arc::new(RedbStore::open(path).await?))
}

/// Build the router for `config` over already-built services.
pub fn app(config: &ServerConfig, services: &Services) -> axum::Router {
    let state = AppState {
        cache: Arc::clone(&services.cache),
        formatter: Arc::clone(&services.formatter),
        api_key: config.api_key.as_deref().map(Arc::from),
        index_path: config.hosts.index_path.clone(),
    };
    let limiters = Limiters::from_config(&services.store, &config.rate_limit);
    http::router(state, limiters)
}

/// Run the HTTP service and the refresh scheduler until Ctrl-C or SIGTERM.
pub async fn run(config: &ServerConfig) -> crate::Result<()> {
    let services = Services::from_config(config).await?;
    let app = app(config, &services);

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|e| crate::SrvError::Server(format!("bind {}: {e}", config.listen)))?;
    let local = listener.local_addr()?;

    let scheduler = config
        .cache
        .refresh_interval()
        .map(|period| Scheduler::spawn(Arc::clone(&services.cache), period));

    info!(
        addr = %local,
        domains = config.hosts.domains.len(),
        providers = services.resolver.providers().len(),
        "gh-hosts listening"
    );

    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }
    served.map_err(|e| crate::SrvError::Server(e.to_string()))?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C"),
        () = terminate => info!("received SIGTERM"),
    }
}
