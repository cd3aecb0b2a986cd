use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, Method, header},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::{self, Catalog};
use crate::config::Config;
use crate::gemini::{AnswerModel, GeminiClient};
use crate::proxy::QuestionProxy;
use crate::routes::create_routes;

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub proxy: QuestionProxy,
    pub catalog: &'static Catalog,
}

/// Initialize tracing and logging for the application
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// The browser calls the proxy from another origin, with the hosting
/// platform's auth headers attached.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
        .allow_methods([Method::POST, Method::OPTIONS])
}

/// Builds the proxy from configuration. A missing key is not fatal at
/// startup; it fails each question instead.
pub fn build_proxy(config: &Config) -> anyhow::Result<QuestionProxy> {
    let model: Option<Arc<dyn AnswerModel>> = match &config.gemini_api_key {
        Some(api_key) => {
            let http = reqwest::Client::builder().build()?;
            info!("Gemini model: {}", config.gemini_model);
            Some(Arc::new(GeminiClient::new(
                http,
                config.gemini_base_url.clone(),
                config.gemini_model.clone(),
                api_key.clone(),
            )))
        }
        None => {
            warn!("GEMINI_API_KEY is not set; every question will fail until it is configured");
            None
        }
    };
    Ok(QuestionProxy::new(model))
}

/// Wires routes and middleware around the given state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Create and configure the Axum application with all routes and middleware
pub fn create_app(config: &Config) -> anyhow::Result<Router> {
    info!("Initializing application router");

    let catalog = catalog::catalog()?;
    let proxy = build_proxy(config)?;

    Ok(build_router(AppState { proxy, catalog }))
}
