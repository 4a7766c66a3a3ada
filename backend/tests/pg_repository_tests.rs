//! PostgreSQL repository tests
//!
//! Need a disposable database: set TEST_DATABASE_URL and run with
//! `cargo test -- --ignored`.

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use loan_servicing_server::db;
use loan_servicing_server::error::ApiError;
use loan_servicing_server::loan::{Loan, Payment};
use loan_servicing_server::models::User;
use loan_servicing_server::repository::{LoanRepository, PgRepository, UserRepository};

async fn repository() -> PgRepository {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    db::run_migrations(&pool).await.expect("Failed to migrate");
    PgRepository::new(pool)
}

fn user(username: &str) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        password_hash: "hash".to_string(),
        created_at: Utc::now(),
    }
}

fn loan(owner_id: Uuid, request_date: NaiveDate) -> Loan {
    Loan {
        id: Uuid::new_v4(),
        nominal_value: dec!(1000.00),
        interest_rate: dec!(0.05),
        iof_rate: dec!(0.00),
        ip_address: "10.0.0.1".to_string(),
        request_date,
        bank: "Banco Teste".to_string(),
        owner_id,
    }
}

#[tokio::test]
#[ignore]
async fn test_user_round_trip_and_unique_username() {
    let repo = repository().await;
    let name = format!("user-{}", Uuid::new_v4());

    let stored = repo.insert_user(user(&name)).await.unwrap();
    let found = repo.find_user_by_username(&name).await.unwrap().unwrap();
    assert_eq!(found.id, stored.id);
    assert!(repo.find_user_by_id(stored.id).await.unwrap().is_some());

    let err = repo.insert_user(user(&name)).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
#[ignore]
async fn test_loans_and_payments_scoped_by_owner() {
    let repo = repository().await;
    let alice = repo
        .insert_user(user(&format!("alice-{}", Uuid::new_v4())))
        .await
        .unwrap();
    let bob = repo
        .insert_user(user(&format!("bob-{}", Uuid::new_v4())))
        .await
        .unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let stored = repo.insert_loan(loan(alice.id, day)).await.unwrap();
    assert_eq!(stored.nominal_value, dec!(1000.00));
    assert_eq!(repo.find_loan(stored.id).await.unwrap(), Some(stored.clone()));

    let payment = Payment {
        id: Uuid::new_v4(),
        loan_id: stored.id,
        payment_date: day,
        payment_value: dec!(175.00),
    };
    repo.insert_payment(payment.clone()).await.unwrap();

    assert_eq!(repo.list_loans_by_owner(alice.id).await.unwrap(), vec![stored.clone()]);
    assert!(repo.list_loans_by_owner(bob.id).await.unwrap().is_empty());
    assert_eq!(repo.list_payments_for_loan(stored.id).await.unwrap(), vec![payment.clone()]);
    assert_eq!(repo.list_payments_by_owner(alice.id).await.unwrap(), vec![payment]);
    assert!(repo.list_payments_by_owner(bob.id).await.unwrap().is_empty());

    repo.ping().await.unwrap();
}
