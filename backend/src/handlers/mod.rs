//! API handlers for the loan servicing backend

pub mod auth;
pub mod health;
pub mod loan;
pub mod payment;

pub use auth::*;
pub use health::health_check;
pub use loan::*;
pub use payment::*;

// Re-export AuthenticatedUser from middleware for handler use
pub use crate::middleware::AuthenticatedUser;
