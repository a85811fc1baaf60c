//! HTTP front for StepLab: maps tutorial URLs onto the core engine.
//!
//! | Route | Answer |
//! |---|---|
//! | `/` | JSON list of steps |
//! | `/info/{step}/` | raw info document (never 404) |
//! | `/test/{step}/` | raw test definition |
//! | `/init/{step}/` | seeds the step from its predecessor |
//! | `/api/{*method}` | mock JSON API |
//! | `/{step}/`, `/{step}/<d>.<8d>.html` | app pages |
//! | `/{step}/[{article}/]{file}` | layered step assets |

pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use steplab_core::Tutorial;
use steplab_shared::ServerConfig;

/// `max-age` values for cacheable responses.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub asset_max_age: u32,
    pub api_max_age: u32,
}

impl From<&ServerConfig> for CachePolicy {
    fn from(config: &ServerConfig) -> Self {
        Self {
            asset_max_age: config.asset_max_age,
            api_max_age: config.api_max_age,
        }
    }
}

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub tutorial: Arc<Tutorial>,
    pub cache: CachePolicy,
}

impl AppState {
    pub fn new(tutorial: Tutorial, cache: CachePolicy) -> Self {
        Self {
            tutorial: Arc::new(tutorial),
            cache,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/info/{step}/", get(handlers::info))
        .route("/info/{step}/{article}/", get(handlers::info_article))
        .route("/test/{step}/", get(handlers::test))
        .route("/test/{step}/{article}/", get(handlers::test_article))
        .route("/init/{step}/", get(handlers::init))
        .route("/init/{step}/{article}/", get(handlers::init_article))
        .route("/api/{*method}", get(handlers::api))
        .route("/{step}/", get(handlers::home))
        .route("/{step}/{name}", get(handlers::step_file))
        .route("/{step}/{name}/{file}", get(handlers::article_file))
        .fallback(handlers::hello)
        .layer(axum::middleware::from_fn(middleware::trailing_slash))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn run(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr = %listener.local_addr()?, "StepLab listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests;
