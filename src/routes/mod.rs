//! Router assembly.

mod catalog;
mod common;
pub mod openapi;

pub use catalog::{actor_routes, movie_routes, user_routes};
pub use common::common_routes;
pub use openapi::ApiDoc;

use crate::middleware::{authenticate, handle_panic, log_request, method_not_allowed, not_found, rate_limit};
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The full application.
pub fn app(state: AppState) -> Router {
    let routes = Router::new()
        .merge(common_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(actor_routes(state.clone()))
        .merge(movie_routes(state.clone()));
    with_middleware(routes, state)
}

/// Layers run outermost first: panic recovery, request logging, rate limiting,
/// authentication.
fn with_middleware(routes: Router, state: AppState) -> Router {
    routes
        .fallback(not_found)
        .layer(axum::middleware::from_fn(method_not_allowed))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(axum::middleware::from_fn(log_request))
                .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit))
                .layer(axum::middleware::from_fn_with_state(state, authenticate)),
        )
}
