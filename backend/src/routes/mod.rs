//! Route definitions for the loan servicing API

mod auth;
mod loan;
mod payment;

use axum::{middleware, routing::get, Router};

use crate::handlers;
use crate::state::AppState;

pub use auth::auth_routes;
pub use loan::loan_routes;
pub use payment::payment_routes;

/// Versioned API prefix
pub const API_PREFIX: &str = "/api/v1";

/// Build the application router with tracing and security headers applied
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth_routes())
        .merge(loan_routes())
        .merge(payment_routes());

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest(API_PREFIX, api)
        .with_state(state)
        .layer(middleware::from_fn(crate::middleware::security_headers))
        .layer(middleware::from_fn(crate::middleware::request_tracing))
}
