//! Auth module
//!
//! Password hashing and JWT issuance/verification.

mod hasher;
mod token;

pub use hasher::PasswordHasher;
pub use token::{Claims, TokenService};
