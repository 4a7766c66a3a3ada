//! Loan service layer - the operations exposed to the HTTP boundary
//!
//! Every operation takes the authenticated caller explicitly. Loans and
//! payments are only ever read or written on behalf of their owner.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::balance;
use super::model::{CreateLoanRequest, CreatePaymentRequest, Loan, Payment, RemainingBalanceResponse};
use crate::clock::Clock;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthenticatedUser;
use crate::repository::LoanRepository;
use crate::validation::{ensure_non_negative, ensure_within_balance, PaymentViolation};

/// Returned when a caller asks for a loan owned by someone else
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to access the resource";

/// Loan service for managing loans and their payments
#[derive(Clone)]
pub struct LoanService {
    repository: Arc<dyn LoanRepository>,
    clock: Arc<dyn Clock>,
}

impl LoanService {
    /// Create a new loan service instance
    pub fn new(repository: Arc<dyn LoanRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Create a loan owned by the caller, requested today
    pub async fn create_loan(
        &self,
        caller: &AuthenticatedUser,
        request: CreateLoanRequest,
    ) -> ApiResult<Loan> {
        let loan = request.into_loan(caller.user_id, self.clock.today())?;
        let loan = self.repository.insert_loan(loan).await?;

        tracing::info!(
            loan_id = %loan.id,
            owner_id = %loan.owner_id,
            nominal_value = %loan.nominal_value,
            "Loan created"
        );

        Ok(loan)
    }

    /// List the caller's loans
    pub async fn list_loans(&self, caller: &AuthenticatedUser) -> ApiResult<Vec<Loan>> {
        self.repository.list_loans_by_owner(caller.user_id).await
    }

    /// Validate and record a payment against one of the caller's loans
    pub async fn create_payment(
        &self,
        caller: &AuthenticatedUser,
        request: CreatePaymentRequest,
    ) -> ApiResult<Payment> {
        let draft = request.into_draft()?;

        // Another borrower's loan is reported exactly like a missing one
        let loan = match self.repository.find_loan(draft.loan_id).await? {
            Some(loan) if loan.is_owned_by(caller.user_id) => loan,
            Some(_) => {
                tracing::warn!(
                    loan_id = %draft.loan_id,
                    caller = %caller.user_id,
                    "Payment attempted against a loan owned by another user"
                );
                return Err(PaymentViolation::ReferenceNotFound.into());
            }
            None => return Err(PaymentViolation::ReferenceNotFound.into()),
        };

        ensure_non_negative(draft.payment_value)?;
        let remaining_balance = self.current_balance(&loan).await?;
        ensure_within_balance(draft.payment_value, remaining_balance)?;

        let payment = self.repository.insert_payment(draft.into_payment()).await?;

        tracing::info!(
            payment_id = %payment.id,
            loan_id = %payment.loan_id,
            payment_value = %payment.payment_value,
            "Payment recorded"
        );

        Ok(payment)
    }

    /// List payments made against the caller's loans
    pub async fn list_payments(&self, caller: &AuthenticatedUser) -> ApiResult<Vec<Payment>> {
        self.repository.list_payments_by_owner(caller.user_id).await
    }

    /// The loan with its balance as of today
    pub async fn get_remaining_balance(
        &self,
        caller: &AuthenticatedUser,
        loan_id: Uuid,
    ) -> ApiResult<RemainingBalanceResponse> {
        let loan = self
            .repository
            .find_loan(loan_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Loan not found".to_string()))?;

        if !loan.is_owned_by(caller.user_id) {
            tracing::warn!(
                loan_id = %loan_id,
                caller = %caller.user_id,
                "Balance requested for a loan owned by another user"
            );
            return Err(ApiError::Forbidden(FORBIDDEN_MESSAGE.to_string()));
        }

        let remaining_balance = self.current_balance(&loan).await?;

        Ok(RemainingBalanceResponse {
            loan,
            remaining_balance,
        })
    }

    /// Check the storage backend is reachable
    pub async fn health_check(&self) -> ApiResult<()> {
        self.repository.ping().await
    }

    async fn current_balance(&self, loan: &Loan) -> ApiResult<Decimal> {
        let payments = self.repository.list_payments_for_loan(loan.id).await?;
        let as_of = self.clock.today();
        let result = balance::breakdown(
            &loan.terms(),
            payments.iter().map(|p| p.payment_value),
            as_of,
        )?;

        tracing::debug!(
            loan_id = %loan.id,
            as_of = %as_of,
            total_paid = %result.total_paid,
            days_passed = result.days_passed,
            accrued_interest = %result.accrued_interest,
            fee = %result.fee,
            remaining_balance = %result.remaining_balance,
            "Balance computed"
        );

        Ok(result.remaining_balance)
    }
}
