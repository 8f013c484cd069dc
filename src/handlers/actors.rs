//! Actor CRUD. Reads need an authenticated user; writes need an admin.

use crate::error::{AppError, ErrorBody};
use crate::extractors::{IdParam, JsonBody, RequireAdmin, RequireAuthenticatedUser};
use crate::model::ActorDraft;
use crate::response::{created, ok, ActorResponse, ActorsResponse, MessageResponse};
use crate::state::AppState;
use crate::store::StoreError;
use axum::{extract::State, response::IntoResponse};

fn actor_write_error(e: StoreError) -> AppError {
    match e {
        StoreError::DuplicateName => AppError::field("full_name", "an actor with this name already exists"),
        other => other.into(),
    }
}

#[utoipa::path(
    post,
    path = "/actors",
    tag = "actors",
    request_body = ActorDraft,
    responses(
        (status = 201, description = "Actor created", body = ActorResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn create_actor(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    JsonBody(draft): JsonBody<ActorDraft>,
) -> Result<impl IntoResponse, AppError> {
    let mut actor = draft.into_actor(0, Vec::new())?;
    actor.id = state.models.actors.insert(&actor).await.map_err(actor_write_error)?;
    tracing::info!(actor_id = actor.id, "actor created");
    Ok(created(ActorResponse { actor }))
}

#[utoipa::path(
    get,
    path = "/actors",
    tag = "actors",
    responses(
        (status = 200, description = "All actors with their movie ids", body = ActorsResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn list_actors(
    State(state): State<AppState>,
    RequireAuthenticatedUser(_user): RequireAuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let actors = state.models.actors.get_all().await?;
    Ok(ok(ActorsResponse { actors }))
}

#[utoipa::path(
    get,
    path = "/actors/{id}",
    tag = "actors",
    params(("id" = i64, Path, description = "Actor id")),
    responses(
        (status = 200, description = "The actor", body = ActorResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such actor", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn get_actor(
    State(state): State<AppState>,
    RequireAuthenticatedUser(_user): RequireAuthenticatedUser,
    IdParam(id): IdParam,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.models.actors.get(id).await?;
    Ok(ok(ActorResponse { actor }))
}

/// Fields left out of the body keep their stored values.
#[utoipa::path(
    patch,
    path = "/actors/{id}",
    tag = "actors",
    params(("id" = i64, Path, description = "Actor id")),
    request_body = ActorDraft,
    responses(
        (status = 200, description = "Updated actor", body = ActorResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "No such actor", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn update_actor(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdParam(id): IdParam,
    JsonBody(draft): JsonBody<ActorDraft>,
) -> Result<impl IntoResponse, AppError> {
    let current = state.models.actors.get(id).await?;
    let actor = draft.merged_onto(&current).into_actor(id, current.movie_ids.clone())?;
    state.models.actors.update(&actor).await.map_err(actor_write_error)?;
    tracing::info!(actor_id = id, "actor updated");
    Ok(ok(ActorResponse { actor }))
}

#[utoipa::path(
    delete,
    path = "/actors/{id}",
    tag = "actors",
    params(("id" = i64, Path, description = "Actor id")),
    responses(
        (status = 200, description = "Actor deleted; movies keep the rest of their cast", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "No such actor", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn delete_actor(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdParam(id): IdParam,
) -> Result<impl IntoResponse, AppError> {
    state.models.actors.delete(id).await?;
    tracing::info!(actor_id = id, "actor deleted");
    Ok(ok(MessageResponse::new("actor successfully deleted")))
}
