mod errors;
mod handlers;
mod middleware;
mod state;

use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use errors::HttpError;
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let gated = Router::new()
        .route("/update_stats", post(handlers::update_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_bearer,
        ));

    let cors = cors_layer(&state.allowed_origins);
    let router = Router::new()
        .route("/", get(handlers::status))
        .route("/health", get(handlers::health))
        .merge(gated)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// `*` allows any origin; an empty list disables CORS entirely.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    if origins.iter().any(|origin| origin == "*") {
        return Some(layer.allow_origin(Any));
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    Some(layer.allow_origin(AllowOrigin::list(allowed)))
}
