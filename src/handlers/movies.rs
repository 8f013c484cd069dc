//! Movie CRUD, sorted listing and search.

use crate::error::{AppError, ErrorBody};
use crate::extractors::{IdParam, JsonBody, RequireAdmin, RequireAuthenticatedUser};
use crate::model::{validate_filters, Filters, MovieDraft, DEFAULT_MOVIE_SORT};
use crate::response::{created, ok, MessageResponse, MovieResponse, MoviesResponse};
use crate::state::AppState;
use crate::store::StoreError;
use crate::validator::Validator;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMoviesQuery {
    /// One of `title`, `rating`, `release_date`; prefix with `-` for descending. Default `-rating`.
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Substring of the title, case-insensitive.
    pub title: Option<String>,
    /// Substring of a cast member's full name, case-insensitive.
    pub actor: Option<String>,
}

fn movie_write_error(e: StoreError) -> AppError {
    match e {
        StoreError::DuplicateName => AppError::field("title", "movie with this title already exists"),
        StoreError::ActorsNotFound => AppError::field("actors", "one or more actor IDs do not exist"),
        other => other.into(),
    }
}

fn query_error(rejection: QueryRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

#[utoipa::path(
    post,
    path = "/movies",
    tag = "movies",
    request_body = MovieDraft,
    responses(
        (status = 201, description = "Movie created with its cast", body = MovieResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 422, description = "Validation failed or unknown actor ids", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn create_movie(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    JsonBody(draft): JsonBody<MovieDraft>,
) -> Result<impl IntoResponse, AppError> {
    let mut movie = draft.into_movie(0)?;
    movie.id = state.models.movies.insert(&movie).await.map_err(movie_write_error)?;
    tracing::info!(movie_id = movie.id, actors = movie.actor_ids.len(), "movie created");
    Ok(created(MovieResponse { movie }))
}

#[utoipa::path(
    get,
    path = "/movies",
    tag = "movies",
    params(ListMoviesQuery),
    responses(
        (status = 200, description = "All movies in the requested order", body = MoviesResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 422, description = "Sort value not allowed", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn list_movies(
    State(state): State<AppState>,
    RequireAuthenticatedUser(_user): RequireAuthenticatedUser,
    query: Result<Query<ListMoviesQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(query_error)?;
    let sort = query
        .sort
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_MOVIE_SORT.to_string());
    let filters = Filters::movies(sort);

    let mut v = Validator::new();
    validate_filters(&mut v, &filters);
    if !v.valid() {
        return Err(v.into());
    }

    let movies = state.models.movies.get_all(&filters).await?;
    Ok(ok(MoviesResponse { movies }))
}

#[utoipa::path(
    get,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "The movie", body = MovieResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such movie", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn get_movie(
    State(state): State<AppState>,
    RequireAuthenticatedUser(_user): RequireAuthenticatedUser,
    IdParam(id): IdParam,
) -> Result<impl IntoResponse, AppError> {
    let movie = state.models.movies.get(id).await?;
    Ok(ok(MovieResponse { movie }))
}

/// Fields left out of the body keep their stored values; a present `actors` list replaces the cast.
#[utoipa::path(
    patch,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    request_body = MovieDraft,
    responses(
        (status = 200, description = "Updated movie", body = MovieResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "No such movie", body = ErrorBody),
        (status = 422, description = "Validation failed or unknown actor ids", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn update_movie(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdParam(id): IdParam,
    JsonBody(draft): JsonBody<MovieDraft>,
) -> Result<impl IntoResponse, AppError> {
    let current = state.models.movies.get(id).await?;
    let movie = draft.merged_onto(&current).into_movie(id)?;
    state.models.movies.update(&movie).await.map_err(movie_write_error)?;
    tracing::info!(movie_id = id, "movie updated");
    Ok(ok(MovieResponse { movie }))
}

#[utoipa::path(
    delete,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "No such movie", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn delete_movie(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdParam(id): IdParam,
) -> Result<impl IntoResponse, AppError> {
    state.models.movies.delete(id).await?;
    tracing::info!(movie_id = id, "movie deleted");
    Ok(ok(MessageResponse::new("movie successfully deleted")))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "movies",
    params(SearchQuery),
    responses(
        (status = 200, description = "Movies matching both filters", body = MoviesResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    ),
    security(("basic_auth" = []))
)]
pub async fn search_movies(
    State(state): State<AppState>,
    RequireAuthenticatedUser(_user): RequireAuthenticatedUser,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(query_error)?;
    let title = query.title.unwrap_or_default();
    let actor = query.actor.unwrap_or_default();
    let movies = state.models.movies.search(&title, &actor).await?;
    tracing::debug!(title = %title, actor = %actor, found = movies.len(), "movie search");
    Ok(ok(MoviesResponse { movies }))
}
