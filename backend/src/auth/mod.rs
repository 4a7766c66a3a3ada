//! Authentication for loan servicing
//!
//! - Username/password registration with bcrypt hashes
//! - Bearer access tokens signed as HS256 JWTs

mod jwt;
mod service;

pub use jwt::{generate_access_token, get_user_id_from_claims, verify_token, Claims, JwtError};
pub use service::{AuthService, INVALID_CREDENTIALS};
