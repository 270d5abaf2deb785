mod blog;
mod config;
mod db;
mod errors;
mod models;
mod optimizer;
mod retry;
mod routes;
mod state;
mod tenant;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::blog::cache::{MemoryCache, RedisCache, ResponseCache, REDIS_OP_TIMEOUT};
use crate::blog::client::WordPressClient;
use crate::blog::BlogGateway;
use crate::config::Config;
use crate::db::create_pool;
use crate::optimizer::OptimizerClient;
use crate::retry::RetryPolicy;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tenant::render::ShellAssets;
use crate::tenant::store::{MemoryProfileStore, PgProfileStore, ProfileStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let profiles: Arc<dyn ProfileStore> = match &config.database_url {
        Some(url) => Arc::new(PgProfileStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set, serving profiles from an empty in-memory store");
            Arc::new(MemoryProfileStore::default())
        }
    };

    // Initialize CMS response cache (Redis when configured, process memory otherwise)
    let cache: Arc<dyn ResponseCache> = match &config.redis_url {
        Some(url) => {
            let redis = redis::Client::open(url.clone())?;
            info!("CMS cache: Redis");
            Arc::new(
                RedisCache::new(redis, config.cms_cache_ttl)
                    .with_op_timeout(REDIS_OP_TIMEOUT.min(config.cms_deadline)),
            )
        }
        None => {
            info!("CMS cache: in-memory");
            Arc::new(MemoryCache::new(config.cms_cache_ttl))
        }
    };

    // Initialize blog gateway
    let policy = RetryPolicy::default().with_deadline(config.cms_deadline);
    info!(
        "CMS retry policy: {} attempts, up to {:?} backoff, {:?} deadline",
        policy.max_attempts,
        policy.total_backoff(),
        policy.deadline
    );
    let wordpress = match &config.wordpress {
        Some(wp) => {
            info!("WordPress client initialized ({})", wp.base_url);
            Some(WordPressClient::new(wp, cache, policy)?)
        }
        None => None,
    };
    let blog = BlogGateway::new(wordpress);

    // Initialize content optimizer
    let optimizer = match &config.openai_api_key {
        Some(key) => {
            info!("Content optimizer initialized (model: {})", optimizer::MODEL);
            Some(OptimizerClient::new(
                key.clone(),
                optimizer::OPENAI_API_BASE,
                RetryPolicy::default().with_deadline(std::time::Duration::from_secs(90)),
            )?)
        }
        None => None,
    };

    info!(
        "Tenant routing on *.{} (preview suffixes: {:?})",
        config.domains.main_domain, config.domains.preview_host_suffixes
    );

    // Build app state
    let state = AppState {
        shell_assets: ShellAssets {
            bundle_path: config.client_bundle_path.clone(),
            stylesheet_path: config.client_stylesheet_path.clone(),
        },
        config: config.clone(),
        blog,
        profiles,
        optimizer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the main domain and published custom domains

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
