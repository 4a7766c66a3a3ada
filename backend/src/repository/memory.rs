//! In-process repository backed by locked maps

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LoanRepository, UserRepository, DUPLICATE_USERNAME};
use crate::error::{ApiError, ApiResult};
use crate::loan::{Loan, Payment};
use crate::models::User;

/// Holds everything in memory. State is lost on restart.
#[derive(Default)]
pub struct InMemoryRepository {
    users: RwLock<HashMap<Uuid, User>>,
    loans: RwLock<HashMap<Uuid, Loan>>,
    payments: RwLock<Vec<Payment>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_payments(payments: &mut [Payment]) {
    payments.sort_by(|a, b| {
        a.payment_date
            .cmp(&b.payment_date)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: User) -> ApiResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == user.username) {
            return Err(ApiError::Conflict(DUPLICATE_USERNAME.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl LoanRepository for InMemoryRepository {
    async fn insert_loan(&self, loan: Loan) -> ApiResult<Loan> {
        let mut loans = self.loans.write().await;

        if loans.contains_key(&loan.id) {
            return Err(ApiError::Conflict(format!("Loan {} already exists", loan.id)));
        }

        loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn find_loan(&self, id: Uuid) -> ApiResult<Option<Loan>> {
        Ok(self.loans.read().await.get(&id).cloned())
    }

    async fn list_loans_by_owner(&self, owner_id: Uuid) -> ApiResult<Vec<Loan>> {
        let loans = self.loans.read().await;
        let mut owned: Vec<Loan> = loans
            .values()
            .filter(|loan| loan.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            a.request_date
                .cmp(&b.request_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(owned)
    }

    async fn insert_payment(&self, payment: Payment) -> ApiResult<Payment> {
        // Mirrors the foreign key on payments.loan_id
        if !self.loans.read().await.contains_key(&payment.loan_id) {
            return Err(ApiError::NotFound(format!("Loan {} not found", payment.loan_id)));
        }

        self.payments.write().await.push(payment.clone());
        Ok(payment)
    }

    async fn list_payments_for_loan(&self, loan_id: Uuid) -> ApiResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments
            .read()
            .await
            .iter()
            .filter(|p| p.loan_id == loan_id)
            .cloned()
            .collect();
        sort_payments(&mut payments);
        Ok(payments)
    }

    async fn list_payments_by_owner(&self, owner_id: Uuid) -> ApiResult<Vec<Payment>> {
        let loans = self.loans.read().await;
        let mut payments: Vec<Payment> = self
            .payments
            .read()
            .await
            .iter()
            .filter(|p| {
                loans
                    .get(&p.loan_id)
                    .is_some_and(|loan| loan.owner_id == owner_id)
            })
            .cloned()
            .collect();
        sort_payments(&mut payments);
        Ok(payments)
    }

    async fn ping(&self) -> ApiResult<()> {
        Ok(())
    }
}
