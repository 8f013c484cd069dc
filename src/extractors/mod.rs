//! Request extractors: authorization gates, path ids and JSON bodies.

pub mod auth;
pub mod id;
pub mod json;

pub use auth::{RequireAdmin, RequireAuthenticatedUser};
pub use id::IdParam;
pub use json::JsonBody;
