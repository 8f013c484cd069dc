//! HTTP Basic authentication. Resolves the caller and stores a [`CurrentUser`]
//! in the request extensions; authorization is left to the route extractors.

use crate::error::AppError;
use crate::model::CurrentUser;
use crate::state::AppState;
use crate::store::{Models, StoreError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

/// Name and password from a `Basic` credential. `None` when the header is malformed.
pub fn parse_basic(value: &HeaderValue) -> Option<(String, String)> {
    let value = value.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    // Only the first colon separates; passwords may contain more.
    let (name, password) = decoded.split_once(':')?;
    Some((name.to_string(), password.to_string()))
}

async fn current_user(models: &Models, headers: &HeaderMap) -> Result<CurrentUser, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(CurrentUser::Anonymous);
    };
    let (name, password) = parse_basic(value).ok_or(AppError::InvalidAuthenticationCredentials)?;
    let user = match models.users.get(&name).await {
        Ok(user) => user,
        Err(StoreError::RecordNotFound) => {
            tracing::debug!(user = %name, "authentication for unknown user");
            return Err(AppError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };
    if !user.password.matches_blocking(password).await? {
        tracing::debug!(user = %name, "password mismatch");
        return Err(AppError::InvalidCredentials);
    }
    Ok(CurrentUser::User(Arc::new(user)))
}

pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let resolved = current_user(&state.models, req.headers()).await;
    let mut response = match resolved {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    };
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(credentials: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(credentials))).unwrap()
    }

    #[test]
    fn well_formed_credentials() {
        assert_eq!(
            parse_basic(&basic("admin:password123")),
            Some(("admin".to_string(), "password123".to_string()))
        );
    }

    #[test]
    fn password_may_contain_colons() {
        assert_eq!(
            parse_basic(&basic("alice:a:b:c")),
            Some(("alice".to_string(), "a:b:c".to_string()))
        );
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let value = HeaderValue::from_str(&format!("basic {}", STANDARD.encode("u:p"))).unwrap();
        assert!(parse_basic(&value).is_some());
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(parse_basic(&HeaderValue::from_static("Bearer abc")).is_none());
        assert!(parse_basic(&HeaderValue::from_static("Basic !!!not-base64")).is_none());
        assert!(parse_basic(&basic("no-colon")).is_none());
        assert!(parse_basic(&HeaderValue::from_static("Basic")).is_none());
    }
}
