//! Request pipeline: panic recovery, logging, rate limiting, authentication.

pub mod auth;
pub mod fallback;
pub mod logging;
pub mod rate_limit;
pub mod recover;

pub use auth::authenticate;
pub use fallback::{method_not_allowed, not_found};
pub use logging::log_request;
pub use rate_limit::{client_ip, rate_limit, RateLimiter};
pub use recover::handle_panic;
