//! Payment route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/payments", get(list_payments).post(create_payment))
}
