//! Loan and payment models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::balance::LoanTerms;
use crate::money::{at_scale, check_precision, AMOUNT_MAX_DIGITS, DECIMAL_PLACES, RATE_MAX_DIGITS};
use crate::validation::{
    validate_ip_literal, FieldErrors, PaymentViolation, NON_NEGATIVE, POSITIVE,
};

/// Loan model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Loan {
    pub id: Uuid,
    pub nominal_value: Decimal,
    /// Monthly rate as a fraction
    pub interest_rate: Decimal,
    pub iof_rate: Decimal,
    pub ip_address: String,
    pub request_date: NaiveDate,
    pub bank: String,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
}

impl Loan {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            nominal_value: self.nominal_value,
            interest_rate: self.interest_rate,
            iof_rate: self.iof_rate,
            request_date: self.request_date,
        }
    }

    /// Whether `user_id` is the borrower this loan belongs to
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Payment model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    #[serde(rename = "loan")]
    pub loan_id: Uuid,
    pub payment_date: NaiveDate,
    pub payment_value: Decimal,
}

/// Request to create a new loan.
///
/// `id`, `owner` and `request_date` are set by the server; any value sent
/// for them is ignored. Decimal fields stay raw JSON until `into_loan`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateLoanRequest {
    pub nominal_value: Option<Value>,
    pub interest_rate: Option<Value>,
    pub iof_rate: Option<Value>,
    #[validate(custom = "validate_ip_literal")]
    pub ip_address: Option<String>,
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub bank: Option<String>,
}

impl CreateLoanRequest {
    /// Validate every field and build the loan owned by `owner_id`
    pub fn into_loan(self, owner_id: Uuid, request_date: NaiveDate) -> Result<Loan, FieldErrors> {
        let mut errors = FieldErrors::new();

        let nominal_value = errors.decimal("nominal_value", self.nominal_value.clone());
        let interest_rate = errors.decimal("interest_rate", self.interest_rate.clone());
        let iof_rate = match self.iof_rate.clone() {
            None => Some(Decimal::ZERO),
            raw => errors.decimal("iof_rate", raw),
        };
        let ip_address = errors.required_text("ip_address", self.ip_address.clone());
        let bank = errors.required_text("bank", self.bank.clone());

        if let Some(value) = nominal_value {
            if let Some(message) = check_precision(value, AMOUNT_MAX_DIGITS, DECIMAL_PLACES) {
                errors.add("nominal_value", message);
            } else if value <= Decimal::ZERO {
                errors.add("nominal_value", POSITIVE);
            }
        }
        for (field, rate) in [("interest_rate", interest_rate), ("iof_rate", iof_rate)] {
            if let Some(value) = rate {
                if let Some(message) = check_precision(value, RATE_MAX_DIGITS, DECIMAL_PLACES) {
                    errors.add(field, message);
                } else if value < Decimal::ZERO {
                    errors.add(field, NON_NEGATIVE);
                }
            }
        }

        if let Err(field_errors) = self.validate() {
            errors.merge(field_errors.into());
        }

        match (nominal_value, interest_rate, iof_rate, ip_address, bank) {
            (Some(nominal_value), Some(interest_rate), Some(iof_rate), Some(ip_address), Some(bank))
                if errors.is_empty() =>
            {
                Ok(Loan {
                    id: Uuid::new_v4(),
                    nominal_value: at_scale(nominal_value, DECIMAL_PLACES),
                    interest_rate: at_scale(interest_rate, DECIMAL_PLACES),
                    iof_rate: at_scale(iof_rate, DECIMAL_PLACES),
                    ip_address,
                    request_date,
                    bank,
                    owner_id,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Request to record a payment against a loan, fields still raw JSON
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePaymentRequest {
    pub loan: Option<Value>,
    pub payment_date: Option<Value>,
    pub payment_value: Option<Value>,
}

/// Payment fields that passed shape validation, before the business rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentDraft {
    pub loan_id: Uuid,
    pub payment_date: NaiveDate,
    pub payment_value: Decimal,
}

impl CreatePaymentRequest {
    /// Check presence, shape and precision of each field
    pub fn into_draft(self) -> Result<PaymentDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        // A loan reference that is not even a UUID cannot name a loan
        let loan_id = errors.uuid(
            "loan",
            self.loan,
            &PaymentViolation::ReferenceNotFound.to_string(),
        );
        let payment_date = errors.date("payment_date", self.payment_date);
        let payment_value = errors.decimal("payment_value", self.payment_value);

        if let Some(value) = payment_value {
            if let Some(message) = check_precision(value, AMOUNT_MAX_DIGITS, DECIMAL_PLACES) {
                errors.add("payment_value", message);
            }
        }

        match (loan_id, payment_date, payment_value) {
            (Some(loan_id), Some(payment_date), Some(payment_value)) if errors.is_empty() => {
                Ok(PaymentDraft {
                    loan_id,
                    payment_date,
                    payment_value: at_scale(payment_value, DECIMAL_PLACES),
                })
            }
            _ => Err(errors),
        }
    }
}

impl PaymentDraft {
    pub fn into_payment(self) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            loan_id: self.loan_id,
            payment_date: self.payment_date,
            payment_value: self.payment_value,
        }
    }
}

/// Loan plus its balance as of today
#[derive(Debug, Clone, Serialize)]
pub struct RemainingBalanceResponse {
    #[serde(flatten)]
    pub loan: Loan,
    pub remaining_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{BLANK, INVALID_DATE, INVALID_IP, INVALID_NUMBER, REQUIRED};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn valid_request() -> CreateLoanRequest {
        CreateLoanRequest {
            nominal_value: Some(json!("1000")),
            interest_rate: Some(json!(0.05)),
            iof_rate: None,
            ip_address: Some("127.0.0.1".to_string()),
            bank: Some("Test Bank".to_string()),
        }
    }

    #[test]
    fn test_into_loan_sets_server_fields() {
        let owner = Uuid::new_v4();
        let loan = valid_request().into_loan(owner, today()).unwrap();

        assert_eq!(loan.owner_id, owner);
        assert_eq!(loan.request_date, today());
        assert_eq!(loan.iof_rate, Decimal::ZERO);
        assert_eq!(loan.nominal_value.to_string(), "1000.00");
        assert_eq!(loan.interest_rate.to_string(), "0.05");
        assert!(loan.is_owned_by(owner));
        assert!(!loan.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_into_loan_accepts_ipv6() {
        let mut request = valid_request();
        request.ip_address = Some("::1".to_string());
        assert!(request.into_loan(Uuid::new_v4(), today()).is_ok());
    }

    #[test]
    fn test_into_loan_stores_ip_as_given() {
        let loan = valid_request().into_loan(Uuid::new_v4(), today()).unwrap();
        assert_eq!(loan.ip_address, "127.0.0.1");

        let mut request = valid_request();
        request.ip_address = Some(" 127.0.0.1 ".to_string());
        let errors = request.into_loan(Uuid::new_v4(), today()).unwrap_err();
        assert_eq!(errors.get("ip_address"), Some(&[INVALID_IP.to_string()][..]));
    }

    #[test]
    fn test_into_loan_reports_missing_fields() {
        let errors = CreateLoanRequest::default()
            .into_loan(Uuid::new_v4(), today())
            .unwrap_err();

        for field in ["nominal_value", "interest_rate", "ip_address", "bank"] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]), "{field}");
        }
        assert!(!errors.contains("iof_rate"));
    }

    #[test]
    fn test_into_loan_rejects_bad_values() {
        let request = CreateLoanRequest {
            nominal_value: Some(json!("0")),
            interest_rate: Some(json!("-0.05")),
            iof_rate: Some(json!("0.001")),
            ip_address: Some("999.1.1.1".to_string()),
            bank: Some(" ".to_string()),
        };
        let errors = request.into_loan(Uuid::new_v4(), today()).unwrap_err();

        assert_eq!(errors.get("nominal_value"), Some(&[POSITIVE.to_string()][..]));
        assert_eq!(errors.get("interest_rate"), Some(&[NON_NEGATIVE.to_string()][..]));
        assert_eq!(
            errors.get("iof_rate"),
            Some(&["Ensure that there are no more than 2 decimal places.".to_string()][..])
        );
        assert_eq!(errors.get("ip_address"), Some(&[INVALID_IP.to_string()][..]));
        assert_eq!(errors.get("bank"), Some(&[BLANK.to_string()][..]));
    }

    #[test]
    fn test_into_loan_rejects_long_bank_name() {
        let mut request = valid_request();
        request.bank = Some("b".repeat(256));
        let errors = request.into_loan(Uuid::new_v4(), today()).unwrap_err();
        assert_eq!(
            errors.get("bank"),
            Some(&["Ensure this field has no more than 255 characters.".to_string()][..])
        );
    }

    #[test]
    fn test_payment_draft_requires_fields() {
        let errors = CreatePaymentRequest::default().into_draft().unwrap_err();
        for field in ["loan", "payment_date", "payment_value"] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]), "{field}");
        }
    }

    #[test]
    fn test_payment_draft_keeps_negative_value_for_rules() {
        let request = CreatePaymentRequest {
            loan: Some(json!(Uuid::new_v4())),
            payment_date: Some(json!("2024-05-10")),
            payment_value: Some(json!(-2000)),
        };
        let draft = request.into_draft().unwrap();
        assert_eq!(draft.payment_value, dec!(-2000));
        assert_eq!(draft.into_payment().payment_date, today());
    }

    #[test]
    fn test_into_loan_reports_malformed_values_per_field() {
        let mut request = valid_request();
        request.nominal_value = Some(json!("abc"));
        request.iof_rate = Some(serde_json::Value::Null);
        let errors = request.into_loan(Uuid::new_v4(), today()).unwrap_err();

        assert_eq!(errors.get("nominal_value"), Some(&[INVALID_NUMBER.to_string()][..]));
        assert_eq!(
            errors.get("iof_rate"),
            Some(&["This field may not be null.".to_string()][..])
        );
        assert!(!errors.contains("interest_rate"));
    }

    #[test]
    fn test_payment_draft_reports_malformed_values_per_field() {
        let request = CreatePaymentRequest {
            loan: Some(json!("not-a-uuid")),
            payment_date: Some(json!("15/01/2024")),
            payment_value: Some(json!("ten")),
        };
        let errors = request.into_draft().unwrap_err();

        assert_eq!(
            errors.get("loan"),
            Some(&[PaymentViolation::ReferenceNotFound.to_string()][..])
        );
        assert_eq!(errors.get("payment_date"), Some(&[INVALID_DATE.to_string()][..]));
        assert_eq!(errors.get("payment_value"), Some(&[INVALID_NUMBER.to_string()][..]));
    }

    #[test]
    fn test_remaining_balance_response_flattens_loan() {
        let loan = valid_request().into_loan(Uuid::new_v4(), today()).unwrap();
        let response = RemainingBalanceResponse {
            loan: loan.clone(),
            remaining_balance: dec!(825.00),
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["id"], serde_json::json!(loan.id.to_string()));
        assert_eq!(json["owner"], serde_json::json!(loan.owner_id.to_string()));
        assert_eq!(json["nominal_value"], "1000.00");
        assert_eq!(json["request_date"], "2024-05-10");
        assert_eq!(json["remaining_balance"], "825.00");
    }
}
