//! Loan Servicing Backend Library
//!
//! Loans, payments and remaining-balance computation behind an
//! authenticated JSON API.

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod loan;
pub mod middleware;
pub mod models;
pub mod money;
pub mod repository;
pub mod routes;
pub mod state;
pub mod validation;
