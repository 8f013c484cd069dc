//! JSON bodies for unmatched routes and methods.

use crate::error::AppError;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// The router answers an unsupported method with an empty 405; give it the usual error body.
/// `Allow` is added by the router after this runs.
pub async fn method_not_allowed(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let response = next.run(req).await;
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        return AppError::MethodNotAllowed(method).into_response();
    }
    response
}
