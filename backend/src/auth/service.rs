//! Authentication service
//!
//! Registration, credential checks and access-token issuance.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthenticatedUser;
use crate::models::{RegisterRequest, TokenRequest, TokenResponse, User};
use crate::repository::{UserRepository, DUPLICATE_USERNAME};
use crate::validation::FieldErrors;

use super::jwt::{generate_access_token, get_user_id_from_claims, verify_token};

/// Returned for an unknown username or a wrong password alike
pub const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_secret: String,
    access_token_ttl_seconds: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            jwt_secret,
            access_token_ttl_seconds,
            bcrypt_cost,
        }
    }

    /// Register a new user with a hashed password
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<User> {
        let registration = request.into_registration()?;
        let password_hash = hash_password(registration.password, self.bcrypt_cost).await?;

        let user = User {
            id: Uuid::new_v4(),
            username: registration.username,
            password_hash,
            created_at: Utc::now(),
        };

        let user = match self.users.insert_user(user).await {
            Ok(user) => user,
            Err(ApiError::Conflict(_)) => {
                return Err(FieldErrors::single("username", DUPLICATE_USERNAME).into())
            }
            Err(e) => return Err(e),
        };

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Exchange a username and password for an access token
    pub async fn issue_token(&self, request: TokenRequest) -> ApiResult<TokenResponse> {
        let mut errors = FieldErrors::new();
        let username = errors.required_text("username", request.username);
        let password = errors.required_text("password", request.password);
        let (Some(username), Some(password)) = (username, password) else {
            return Err(errors.into());
        };

        let user = match self.users.find_user_by_username(&username).await? {
            Some(user) => user,
            None => {
                tracing::warn!(username = %username, "Token requested for unknown user");
                return Err(invalid_credentials());
            }
        };

        if !verify_password(password, user.password_hash.clone()).await? {
            tracing::warn!(user_id = %user.id, "Token requested with wrong password");
            return Err(invalid_credentials());
        }

        let jti = Uuid::new_v4().to_string();
        let token = generate_access_token(
            &user,
            &jti,
            &self.jwt_secret,
            self.access_token_ttl_seconds,
        )?;

        tracing::info!(user_id = %user.id, "Access token issued");

        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl_seconds,
        })
    }

    /// Resolve a bearer token to the user it was issued for
    pub async fn authenticate(&self, token: &str) -> ApiResult<AuthenticatedUser> {
        let claims = verify_token(token, &self.jwt_secret)?;
        let user_id = get_user_id_from_claims(&claims)?;

        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid token.".to_string()))?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
        })
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: Uuid) -> ApiResult<User> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}

fn invalid_credentials() -> ApiError {
    FieldErrors::single("non_field_errors", INVALID_CREDENTIALS).into()
}

async fn hash_password(password: String, cost: u32) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))
}

async fn verify_password(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))
}
