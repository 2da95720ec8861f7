//! HTTP server for subtrimd.

use crate::auth::{IdentityVerifier, TokeninfoVerifier};
use crate::cache::PriceCache;
use crate::config::Config;
use crate::liveness::LinkLivenessChecker;
use crate::llm::{CompletionClient, HttpCompletionClient};
use crate::routes;
use anyhow::Result;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Maximum request body size: 64 KiB
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Application state shared across handlers. The price cache is the only
/// mutable piece; everything else is read-only collaborators.
pub struct AppState {
    pub config: Config,
    pub completion: Arc<dyn CompletionClient>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub liveness: LinkLivenessChecker,
    pub price_cache: PriceCache,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Production state with real collaborators.
    pub fn new(config: Config) -> Self {
        let completion = Arc::new(HttpCompletionClient::new(&config.llm));
        let verifier = Arc::new(TokeninfoVerifier::new(&config.auth));
        Self::with_collaborators(config, completion, verifier)
    }

    /// State with injected collaborators, used by tests.
    pub fn with_collaborators(
        config: Config,
        completion: Arc<dyn CompletionClient>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let price_cache = PriceCache::new(
            config.price_cache_capacity,
            Duration::from_secs(config.price_cache_ttl_secs),
        );
        Self {
            config,
            completion,
            verifier,
            liveness: LinkLivenessChecker::new(),
            price_cache,
            started_at: Utc::now(),
        }
    }
}

/// Assemble the full router: route groups, 404 fallback, then middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::classify_routes())
        .merge(routes::assist_routes())
        .fallback(routes::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
}

/// Run the HTTP server until shutdown.
pub async fn run(state: AppState) -> Result<()> {
    let port = state.config.port;
    let app = build_router(Arc::new(state));

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
