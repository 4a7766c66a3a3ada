//! Payment HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use super::AuthenticatedUser;
use crate::error::ApiResult;
use crate::loan::{CreatePaymentRequest, Payment};
use crate::state::AppState;

/// POST /api/v1/payments - Record a payment on one of the caller's loans
pub async fn create_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let Json(req) = payload?;
    let payment = state.loan_service.create_payment(&user, req).await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /api/v1/payments - Payments on every loan the caller owns
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Payment>>> {
    let payments = state.loan_service.list_payments(&user).await?;

    Ok(Json(payments))
}
