//! Field-level validation errors and the payment business rules
//!
//! Every rejected request body is reported as a map of field name to
//! messages, for example `{"payment_value": ["Payment amount greater than remaining balance."]}`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationError;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NON_NEGATIVE: &str = "Ensure this value is greater than or equal to 0.0.";
pub const POSITIVE: &str = "Ensure this value is greater than 0.";
pub const INVALID_IP: &str = "Enter a valid IPv4 or IPv6 address.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// Field name -> list of human-readable reasons
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding a single message for one field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take over errors for fields that have no error yet.
    ///
    /// A field reported as missing or blank keeps that single message.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_insert(messages);
        }
    }

    /// Unwrap a required field, recording `REQUIRED` when it is absent
    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value
    }

    /// Unwrap a required text field, rejecting whitespace-only input
    pub fn required_text(&mut self, field: &str, value: Option<String>) -> Option<String> {
        match self.required(field, value) {
            Some(text) if text.trim().is_empty() => {
                self.add(field, BLANK);
                None
            }
            other => other,
        }
    }
}

/// Typed readers over raw JSON field values.
///
/// Request bodies keep typed fields as `serde_json::Value` so a value of the
/// wrong shape is reported against its own field instead of failing the
/// whole body.
impl FieldErrors {
    fn present(&mut self, field: &str, value: Option<Value>) -> Option<Value> {
        match self.required(field, value) {
            Some(Value::Null) => {
                self.add(field, NOT_NULL);
                None
            }
            other => other,
        }
    }

    /// Required decimal, from a JSON number or a numeric string
    pub fn decimal(&mut self, field: &str, value: Option<Value>) -> Option<Decimal> {
        let value = self.present(field, value)?;
        let parsed = match &value {
            Value::String(text) => parse_decimal(text.trim()),
            Value::Number(number) => parse_decimal(&number.to_string()),
            _ => None,
        };
        if parsed.is_none() {
            self.add(field, INVALID_NUMBER);
        }
        parsed
    }

    /// Required `YYYY-MM-DD` date
    pub fn date(&mut self, field: &str, value: Option<Value>) -> Option<NaiveDate> {
        let value = self.present(field, value)?;
        let parsed = value
            .as_str()
            .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok());
        if parsed.is_none() {
            self.add(field, INVALID_DATE);
        }
        parsed
    }

    /// Required UUID; anything that is not one is reported with `invalid`
    pub fn uuid(&mut self, field: &str, value: Option<Value>, invalid: &str) -> Option<Uuid> {
        let value = self.present(field, value)?;
        let parsed = value.as_str().and_then(|text| Uuid::parse_str(text).ok());
        if parsed.is_none() {
            self.add(field, invalid);
        }
        parsed
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// `validator` custom rule for IPv4 and IPv6 literals
pub fn validate_ip_literal(value: &str) -> Result<(), ValidationError> {
    if validator::validate_ip(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("ip");
    error.message = Some(Cow::Borrowed(INVALID_IP));
    Err(error)
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, messages.join(" "))?;
            first = false;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            for error in list {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => match error.code.as_ref() {
                        "ip" => INVALID_IP.to_string(),
                        code => format!("Invalid value ({}).", code),
                    },
                };
                fields.add(field, message);
            }
        }
        fields
    }
}

/// Reasons a payment is refused before it is stored
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentViolation {
    #[error("Loan does not exist.")]
    ReferenceNotFound,

    #[error("Ensure this value is greater than or equal to 0.0.")]
    InvalidValue,

    #[error("Payment amount greater than remaining balance.")]
    ExceedsBalance,
}

impl PaymentViolation {
    /// Request field the violation is reported against
    pub fn field(&self) -> &'static str {
        match self {
            PaymentViolation::ReferenceNotFound => "loan",
            PaymentViolation::InvalidValue | PaymentViolation::ExceedsBalance => "payment_value",
        }
    }
}

impl From<PaymentViolation> for FieldErrors {
    fn from(violation: PaymentViolation) -> Self {
        FieldErrors::single(violation.field(), violation.to_string())
    }
}

/// Payment values may be zero but never negative
pub fn ensure_non_negative(payment_value: Decimal) -> Result<(), PaymentViolation> {
    if payment_value.is_sign_negative() && !payment_value.is_zero() {
        return Err(PaymentViolation::InvalidValue);
    }
    Ok(())
}

/// A payment may settle the balance exactly but not exceed it
pub fn ensure_within_balance(
    payment_value: Decimal,
    remaining_balance: Decimal,
) -> Result<(), PaymentViolation> {
    if payment_value > remaining_balance {
        return Err(PaymentViolation::ExceedsBalance);
    }
    Ok(())
}
