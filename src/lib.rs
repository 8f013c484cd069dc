//! Filmoteka: movie catalog REST backend with role-based access on PostgreSQL.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod validator;

pub use config::{Config, ConfigError, Environment, LimiterConfig};
pub use error::AppError;
pub use handlers::users::ensure_admin;
pub use middleware::RateLimiter;
pub use routes::{app, ApiDoc};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_schema, Models, StoreError};
