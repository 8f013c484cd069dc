//! Catalog entities and their validation rules.

pub mod actor;
pub mod filters;
pub mod movie;
pub mod password;
pub mod user;

pub use actor::{validate_actor, Actor, ActorDraft, Gender};
pub use filters::{validate_filters, Filters, DEFAULT_MOVIE_SORT, MOVIE_SORT_SAFELIST};
pub use movie::{validate_movie, Movie, MovieDraft};
pub use password::{Password, PasswordError};
pub use user::{validate_password_plaintext, validate_user, CurrentUser, Role, User};
