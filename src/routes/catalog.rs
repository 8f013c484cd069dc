//! Catalog routes. Access rules live in the handlers' extractors.

use crate::handlers::actors::{create_actor, delete_actor, get_actor, list_actors, update_actor};
use crate::handlers::movies::{create_movie, delete_movie, get_movie, list_movies, search_movies, update_movie};
use crate::handlers::users::register_user;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", post(register_user))
        .with_state(state)
}

pub fn actor_routes(state: AppState) -> Router {
    Router::new()
        .route("/actors", get(list_actors).post(create_actor))
        .route("/actors/:id", get(get_actor).patch(update_actor).delete(delete_actor))
        .with_state(state)
}

pub fn movie_routes(state: AppState) -> Router {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/:id", get(get_movie).patch(update_movie).delete(delete_movie))
        .route("/search", get(search_movies))
        .with_state(state)
}
