//! Remaining balance of a loan on a given date
//!
//! Interest is simple and accrues per day at `interest_rate / 30` on the
//! principal net of everything paid so far. The IOF fee is a flat charge on
//! the original principal. The result is rounded half-to-even to cents and
//! may be negative after an overpayment.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::money::to_currency;

/// Days in the monthly rate period. No calendar-month logic is applied.
pub const DAYS_PER_RATE_PERIOD: i64 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("evaluation date {as_of} precedes the loan request date {request_date}")]
    EvaluationBeforeOrigination {
        as_of: NaiveDate,
        request_date: NaiveDate,
    },
}

/// Loan fields the balance depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTerms {
    pub nominal_value: Decimal,
    /// Monthly rate as a fraction, 0.05 = 5% per month
    pub interest_rate: Decimal,
    /// One-time fee rate on the principal
    pub iof_rate: Decimal,
    pub request_date: NaiveDate,
}

/// Intermediate values of one balance evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceBreakdown {
    pub total_paid: Decimal,
    pub days_passed: i64,
    pub accrued_interest: Decimal,
    pub fee: Decimal,
    pub remaining_balance: Decimal,
}

/// Sum of payment values, zero when there are none
pub fn total_paid<I>(payments: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    payments.into_iter().sum()
}

/// Evaluate the balance and keep every intermediate term
pub fn breakdown<I>(
    terms: &LoanTerms,
    payments: I,
    as_of: NaiveDate,
) -> Result<BalanceBreakdown, BalanceError>
where
    I: IntoIterator<Item = Decimal>,
{
    if as_of < terms.request_date {
        return Err(BalanceError::EvaluationBeforeOrigination {
            as_of,
            request_date: terms.request_date,
        });
    }

    let total_paid = total_paid(payments);
    let days_passed = (as_of - terms.request_date).num_days();
    let daily_rate = terms.interest_rate / Decimal::from(DAYS_PER_RATE_PERIOD);
    let accrued_interest =
        daily_rate * Decimal::from(days_passed) * (terms.nominal_value - total_paid);
    let fee = terms.iof_rate * terms.nominal_value;
    let remaining_balance =
        to_currency(terms.nominal_value + accrued_interest + fee - total_paid);

    Ok(BalanceBreakdown {
        total_paid,
        days_passed,
        accrued_interest,
        fee,
        remaining_balance,
    })
}

/// Remaining balance of a loan as of `as_of`, in currency precision
pub fn remaining_balance<I>(
    terms: &LoanTerms,
    payments: I,
    as_of: NaiveDate,
) -> Result<Decimal, BalanceError>
where
    I: IntoIterator<Item = Decimal>,
{
    breakdown(terms, payments, as_of).map(|b| b.remaining_balance)
}
