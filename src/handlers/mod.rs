//! HTTP handlers for health, users, actors and movies.

pub mod actors;
pub mod healthcheck;
pub mod movies;
pub mod users;
