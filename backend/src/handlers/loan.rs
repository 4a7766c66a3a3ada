//! Loan HTTP handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::loan::{CreateLoanRequest, Loan, RemainingBalanceResponse};
use crate::state::AppState;

/// POST /api/v1/loans - Create a loan for the caller
pub async fn create_loan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateLoanRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let Json(req) = payload?;
    let loan = state.loan_service.create_loan(&user, req).await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// GET /api/v1/loans - List the caller's loans
pub async fn list_loans(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Loan>>> {
    let loans = state.loan_service.list_loans(&user).await?;

    Ok(Json(loans))
}

/// GET /api/v1/loans/:id/remaining_balance
///
/// A path id that is not a UUID cannot name a loan and is a 404.
pub async fn get_remaining_balance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    loan_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<RemainingBalanceResponse>> {
    let Path(loan_id) = loan_id.map_err(|_| ApiError::NotFound("Loan not found".to_string()))?;
    let balance = state
        .loan_service
        .get_remaining_balance(&user, loan_id)
        .await?;

    Ok(Json(balance))
}
