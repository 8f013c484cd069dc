use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Positive integer `:id` path segment. Anything else is reported as 404.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdParam(pub i64);

impl IdParam {
    pub fn parse(raw: &str) -> Option<i64> {
        raw.parse::<i64>().ok().filter(|id| *id >= 1)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Self::parse(&raw).map(Self).ok_or(AppError::NotFound)
    }
}
