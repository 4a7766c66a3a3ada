//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::AuthService;
use crate::config::StorageBackend;
use crate::loan::LoanService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub loan_service: Arc<LoanService>,
    pub auth_service: Arc<AuthService>,
    pub storage: StorageBackend,
}

impl AppState {
    pub fn new(
        loan_service: Arc<LoanService>,
        auth_service: Arc<AuthService>,
        storage: StorageBackend,
    ) -> Self {
        Self {
            loan_service,
            auth_service,
            storage,
        }
    }
}

impl FromRef<AppState> for Arc<LoanService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.loan_service.clone()
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}
