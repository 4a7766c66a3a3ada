//! Loans, payments and the remaining-balance computation

pub mod balance;
pub mod model;
pub mod service;

pub use balance::{remaining_balance, BalanceBreakdown, BalanceError, LoanTerms};
pub use model::{
    CreateLoanRequest, CreatePaymentRequest, Loan, Payment, PaymentDraft, RemainingBalanceResponse,
};
pub use service::{LoanService, FORBIDDEN_MESSAGE};
