//! Registration and token HTTP handlers

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use super::AuthenticatedUser;
use crate::error::ApiResult;
use crate::models::{RegisterRequest, TokenRequest, TokenResponse, UserResponse};
use crate::state::AppState;

/// POST /api/v1/users - Register a borrower
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(req) = payload?;
    let user = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/token - Exchange credentials for an access token
pub async fn obtain_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = payload?;
    let token = state.auth_service.issue_token(req).await?;

    Ok(Json(token))
}

/// GET /api/v1/users/me - The authenticated caller
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<UserResponse>> {
    let user = state.auth_service.get_user(user.user_id).await?;

    Ok(Json(user.into()))
}
