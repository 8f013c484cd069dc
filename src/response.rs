//! Response envelopes: every body is a JSON object keyed by what it carries.

use crate::model::{Actor, Movie, User};
use axum::{http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ActorResponse {
    pub actor: Actor,
}

#[derive(Serialize, ToSchema)]
pub struct ActorsResponse {
    pub actors: Vec<Actor>,
}

#[derive(Serialize, ToSchema)]
pub struct MovieResponse {
    pub movie: Movie,
}

#[derive(Serialize, ToSchema)]
pub struct MoviesResponse {
    pub movies: Vec<Movie>,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SystemInfo {
    pub environment: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub system_info: SystemInfo,
}

pub fn created<T: Serialize>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(body))
}

pub fn ok<T: Serialize>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(body))
}
