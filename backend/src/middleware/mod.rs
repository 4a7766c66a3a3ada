//! Middleware for the loan servicing API
//!
//! Request tracing, security headers, and bearer-token authentication.

pub mod auth;
mod security;
mod tracing;

pub use auth::AuthenticatedUser;
pub use security::{hsts_header, security_headers};
pub use self::tracing::request_tracing;
