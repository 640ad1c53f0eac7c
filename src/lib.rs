//! merch_store Library
//!
//! Re-exports modules for the server binary, the load test and
//! integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{AccountId, Coins, CoinsError, DomainError, OperationContext, UserReport};
