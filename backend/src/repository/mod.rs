//! Storage seam for users, loans and payments
//!
//! Services depend on these traits only. `PgRepository` backs production;
//! `InMemoryRepository` keeps the same semantics without a database.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::loan::{Loan, Payment};
use crate::models::User;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

/// Message for a username that is already registered
pub const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user. Fails with `ApiError::Conflict` on a taken username.
    async fn insert_user(&self, user: User) -> ApiResult<User>;

    async fn find_user_by_username(&self, username: &str) -> ApiResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> ApiResult<Option<User>>;
}

#[async_trait]
pub trait LoanRepository: Send + Sync {
    async fn insert_loan(&self, loan: Loan) -> ApiResult<Loan>;

    async fn find_loan(&self, id: Uuid) -> ApiResult<Option<Loan>>;

    /// Loans ordered by request date, then id
    async fn list_loans_by_owner(&self, owner_id: Uuid) -> ApiResult<Vec<Loan>>;

    async fn insert_payment(&self, payment: Payment) -> ApiResult<Payment>;

    /// Payments ordered by payment date, then id
    async fn list_payments_for_loan(&self, loan_id: Uuid) -> ApiResult<Vec<Payment>>;

    /// Payments on every loan owned by `owner_id`, ordered by payment date, then id
    async fn list_payments_by_owner(&self, owner_id: Uuid) -> ApiResult<Vec<Payment>>;

    async fn ping(&self) -> ApiResult<()>;
}
