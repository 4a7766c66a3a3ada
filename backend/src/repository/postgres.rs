//! PostgreSQL-backed repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{LoanRepository, UserRepository, DUPLICATE_USERNAME};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::loan::{Loan, Payment};
use crate::models::User;

const LOAN_COLUMNS: &str =
    "id, nominal_value, interest_rate, iof_rate, ip_address, request_date, bank, owner_id";

#[derive(Clone)]
pub struct PgRepository {
    db_pool: PgPool,
}

impl PgRepository {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn insert_user(&self, user: User) -> ApiResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ApiError::Conflict(DUPLICATE_USERNAME.to_string())
            }
            other => other.into(),
        })
    }

    async fn find_user_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl LoanRepository for PgRepository {
    async fn insert_loan(&self, loan: Loan) -> ApiResult<Loan> {
        let query = format!(
            r#"
            INSERT INTO loans ({LOAN_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {LOAN_COLUMNS}
            "#
        );

        let loan = sqlx::query_as::<_, Loan>(&query)
            .bind(loan.id)
            .bind(loan.nominal_value)
            .bind(loan.interest_rate)
            .bind(loan.iof_rate)
            .bind(&loan.ip_address)
            .bind(loan.request_date)
            .bind(&loan.bank)
            .bind(loan.owner_id)
            .fetch_one(&self.db_pool)
            .await?;

        Ok(loan)
    }

    async fn find_loan(&self, id: Uuid) -> ApiResult<Option<Loan>> {
        let query = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE id = $1");

        let loan = sqlx::query_as::<_, Loan>(&query)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(loan)
    }

    async fn list_loans_by_owner(&self, owner_id: Uuid) -> ApiResult<Vec<Loan>> {
        let query = format!(
            "SELECT {LOAN_COLUMNS} FROM loans WHERE owner_id = $1 ORDER BY request_date, id"
        );

        let loans = sqlx::query_as::<_, Loan>(&query)
            .bind(owner_id)
            .fetch_all(&self.db_pool)
            .await?;

        Ok(loans)
    }

    async fn insert_payment(&self, payment: Payment) -> ApiResult<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, loan_id, payment_date, payment_value)
            VALUES ($1, $2, $3, $4)
            RETURNING id, loan_id, payment_date, payment_value
            "#,
        )
        .bind(payment.id)
        .bind(payment.loan_id)
        .bind(payment.payment_date)
        .bind(payment.payment_value)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(payment)
    }

    async fn list_payments_for_loan(&self, loan_id: Uuid) -> ApiResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, loan_id, payment_date, payment_value
            FROM payments
            WHERE loan_id = $1
            ORDER BY payment_date, id
            "#,
        )
        .bind(loan_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(payments)
    }

    async fn list_payments_by_owner(&self, owner_id: Uuid) -> ApiResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.id, p.loan_id, p.payment_date, p.payment_value
            FROM payments p
            JOIN loans l ON l.id = p.loan_id
            WHERE l.owner_id = $1
            ORDER BY p.payment_date, p.id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(payments)
    }

    async fn ping(&self) -> ApiResult<()> {
        db::check_health(&self.db_pool)
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))
    }
}
