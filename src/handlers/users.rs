//! Registration and admin bootstrap.

use crate::error::{AppError, ErrorBody};
use crate::extractors::JsonBody;
use crate::model::{validate_user, Password, Role, User};
use crate::response::{created, UserResponse};
use crate::state::AppState;
use crate::store::{Models, StoreError};
use crate::validator::Validator;
use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

/// Validate, hash and store a new account.
async fn create_account(models: &Models, name: String, password: String, role: Role) -> Result<User, AppError> {
    let mut v = Validator::new();
    validate_user(&mut v, &name, &password);
    if !v.valid() {
        return Err(v.into());
    }

    let mut user = User {
        id: 0,
        name,
        password: Password::hash_blocking(password).await?,
        role,
    };
    user.id = models.users.insert(&user).await.map_err(|e| match e {
        StoreError::DuplicateName => AppError::field("name", "a user with this name already exists"),
        other => other.into(),
    })?;
    Ok(user)
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered with the user role", body = UserResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = create_account(&state.models, input.name, input.password, Role::User).await?;
    tracing::info!(user_id = user.id, "user registered");
    Ok(created(UserResponse { user }))
}

/// Create the admin account unless a user with that name exists. Returns whether one was created.
pub async fn ensure_admin(models: &Models, name: &str, password: &str) -> Result<bool, AppError> {
    match models.users.get(name).await {
        Ok(existing) => {
            if existing.role != Role::Admin {
                tracing::warn!(user = %name, "seed admin name is taken by a non-admin account");
            }
            Ok(false)
        }
        Err(StoreError::RecordNotFound) => {
            let admin = create_account(models, name.to_string(), password.to_string(), Role::Admin).await?;
            tracing::info!(user_id = admin.id, user = %admin.name, "admin account created");
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
