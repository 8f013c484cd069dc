//! Authorization gates. Each reads the [`CurrentUser`] placed by the authentication middleware.

use crate::error::AppError;
use crate::model::{CurrentUser, Role, User};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Any authenticated user. Anonymous callers get 401.
#[derive(Clone, Debug)]
pub struct RequireAuthenticatedUser(pub Arc<User>);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(CurrentUser::User(user)) => Ok(Self(user.clone())),
            Some(CurrentUser::Anonymous) | None => Err(AppError::AuthenticationRequired),
        }
    }
}

/// An authenticated user with the admin role: 401 when anonymous, 403 otherwise.
#[derive(Clone, Debug)]
pub struct RequireAdmin(pub Arc<User>);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuthenticatedUser(user) = RequireAuthenticatedUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            tracing::debug!(user = %user.name, "admin route refused");
            return Err(AppError::NotPermitted);
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Password;
    use axum::http::Request;

    fn parts_with(user: Option<CurrentUser>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    fn user(role: Role) -> CurrentUser {
        CurrentUser::User(Arc::new(User {
            id: 1,
            name: "someone".into(),
            password: Password::from_hash("$argon2id$x"),
            role,
        }))
    }

    #[tokio::test]
    async fn anonymous_is_refused_by_both_gates() {
        let mut parts = parts_with(Some(CurrentUser::Anonymous));
        let err = RequireAuthenticatedUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired));
        let err = RequireAdmin::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn missing_identity_counts_as_anonymous() {
        let mut parts = parts_with(None);
        let err = RequireAuthenticatedUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn user_role_is_not_admin() {
        let mut parts = parts_with(Some(user(Role::User)));
        assert!(RequireAuthenticatedUser::from_request_parts(&mut parts, &()).await.is_ok());
        let err = RequireAdmin::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted));
    }

    #[tokio::test]
    async fn admin_passes() {
        let mut parts = parts_with(Some(user(Role::Admin)));
        let RequireAdmin(admin) = RequireAdmin::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
