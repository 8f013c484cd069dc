//! Turn handler panics into a 500 response.

use crate::error::AppError;
use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use std::any::Any;

/// Panic handler for `CatchPanicLayer::custom`. The connection is closed after the reply.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    let mut response = AppError::Internal(format!("panic: {}", detail)).into_response();
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}
