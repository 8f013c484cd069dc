//! Typed errors and HTTP mapping.

use crate::model::PasswordError;
use crate::store::StoreError;
use crate::validator::Validator;
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use utoipa::ToSchema;

pub use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("failed validation")]
    Validation(BTreeMap<String, String>),
    #[error("the requested resource could not be found")]
    NotFound,
    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(Method),
    #[error("invalid or missing authentication credentials")]
    InvalidAuthenticationCredentials,
    #[error("invalid authentication credentials")]
    InvalidCredentials,
    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,
    #[error("your user account doesn't have the necessary permissions to access this resource")]
    NotPermitted,
    #[error("rate limit exceeded")]
    RateLimitExceeded,
    /// The detail is logged, never sent to the client.
    #[error("internal: {0}")]
    Internal(String),
}

const INTERNAL_MESSAGE: &str = "the server encountered a problem and could not process your request";

impl AppError {
    /// A single-field validation failure.
    pub fn field(field: &str, message: &str) -> Self {
        let mut v = Validator::new();
        v.add_error(field, message);
        v.into()
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidAuthenticationCredentials
            | AppError::InvalidCredentials
            | AppError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AppError::NotPermitted => StatusCode::FORBIDDEN,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Validator> for AppError {
    fn from(v: Validator) -> Self {
        AppError::Validation(v.into_errors())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RecordNotFound => AppError::NotFound,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// Error envelope: `{"error": "<message>"}`, or a field → message object for 422.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(value_type = Object)]
    pub error: serde_json::Value,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::Validation(errors) => serde_json::json!(errors),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                serde_json::Value::String(INTERNAL_MESSAGE.to_string())
            }
            other => serde_json::Value::String(other.to_string()),
        };
        let mut response = (status, Json(ErrorBody { error })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}
