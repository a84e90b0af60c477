//! Route configuration and setup

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use avatar_core::Config;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
///
/// The per-file ceiling is enforced while parsing; the body limit layer only bounds a
/// request as a whole.
pub fn build_router(state: AppState) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state.config)?;

    let avatar_routes = Router::new()
        .route("/avatars", post(handlers::avatars::upload_avatars))
        .route(
            "/avatars/{backend_key}",
            delete(handlers::avatars::delete_avatar),
        );

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest(API_PREFIX, avatar_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_request_body_bytes()))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
