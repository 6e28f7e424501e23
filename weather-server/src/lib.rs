//! HTTP proxy in front of the upstream weather and geocoding APIs.
//!
//! Validates and sanitizes `city` / `query`, forwards them upstream, reshapes
//! the answers, and applies rate limiting, CORS, a body size cap, security
//! headers and request logging to every route. A panicking handler is
//! answered with a generic 500.

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower_http::catch_panic::CatchPanicLayer;

pub mod config;
pub mod error;
pub mod handlers;
mod middleware;
pub mod rate_limit;
pub mod state;

pub use config::{AppEnv, ConfigError, CorsPolicy, RateLimitConfig, ServerConfig};
pub use error::{ApiError, ErrorBody};
pub use state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/test", get(handlers::test))
        .route("/weather", get(handlers::weather))
        .route("/cities", get(handlers::cities))
}

/// The full application. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()` so rate limiting can
/// key on the client address.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api_routes())
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(middleware::panic_response))
        .layer(from_fn_with_state(state.clone(), middleware::body_limit))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(from_fn_with_state(state.clone(), middleware::cors))
        .layer(from_fn(middleware::security_headers))
        .layer(from_fn_with_state(state.clone(), middleware::request_logging))
        .with_state(state)
}
