//! Command definitions
//!
//! Commands carry already-authenticated identity and already-validated
//! input into the handlers.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Coins};

// =========================================================================
// AuthenticateCommand
// =========================================================================

/// Command to log in, registering the account on first use
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthenticateCommand {
    pub username: String,
    pub password: String,
}

impl AuthenticateCommand {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

impl std::fmt::Debug for AuthenticateCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticateCommand")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to send coins to another employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    /// Authenticated sender
    pub from: AccountId,
    /// Receiver's account name
    pub to_user: String,
    pub amount: Coins,
}

impl TransferCommand {
    pub fn new(from: AccountId, to_user: impl Into<String>, amount: Coins) -> Self {
        Self {
            from,
            to_user: to_user.into(),
            amount,
        }
    }
}

// =========================================================================
// BuyItemCommand
// =========================================================================

/// Command to buy one unit of a catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyItemCommand {
    pub account: AccountId,
    pub item: String,
}

impl BuyItemCommand {
    pub fn new(account: AccountId, item: impl Into<String>) -> Self {
        Self {
            account,
            item: item.into(),
        }
    }
}
