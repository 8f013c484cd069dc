//! Common routes: health and the OpenAPI document.

use crate::handlers::healthcheck::healthcheck;
use crate::routes::openapi::ApiDoc;
use crate::state::AppState;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /healthcheck, GET /openapi.json. No authentication required.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
}
