use crate::response::{ok, HealthResponse, SystemInfo};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "healthcheck",
    responses((status = 200, description = "Service is available", body = HealthResponse))
)]
pub async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    ok(HealthResponse {
        status: "available".to_string(),
        system_info: SystemInfo {
            environment: state.config.env.as_str().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}
