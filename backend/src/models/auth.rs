//! Authentication request and response DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::FieldErrors;

/// Request to register a borrower account
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub username: Option<String>,
    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password: Option<String>,
}

/// Registration fields after validation
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

const USERNAME_CHARS: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

impl RegisterRequest {
    pub fn into_registration(self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = errors.required_text("username", self.username.clone());
        let password = errors.required_text("password", self.password.clone());

        if let Some(name) = &username {
            let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
            if !name.chars().all(allowed) {
                errors.add("username", USERNAME_CHARS);
            }
        }

        if let Err(field_errors) = self.validate() {
            errors.merge(field_errors.into());
        }

        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => {
                Ok(Registration { username, password })
            }
            _ => Err(errors),
        }
    }
}

/// Request for an access token
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Issued access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}
