pub mod auth;
pub mod logging;

pub use auth::require_bearer;
pub use logging::logging_middleware;
