//! Registration and token routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::auth;
use crate::state::AppState;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(auth::register_user))
        .route("/users/me", get(auth::current_user))
        .route("/token", post(auth::obtain_token))
}
