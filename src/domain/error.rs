//! Domain Error Types
//!
//! Errors returned by the payment, report and auth flows. Store failures
//! never leak through here: they are logged where they happen and mapped
//! to one of the opaque `*Failed` variants.

use thiserror::Error;

/// Domain-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Sender's balance does not cover the amount
    #[error("not enough balance")]
    InsufficientBalance,

    /// Transfer where sender and receiver are the same account
    #[error("cannot transfer coins to yourself")]
    SelfTransfer,

    /// Receiver (or report subject) does not exist
    #[error("user not found")]
    UserNotFound,

    /// No catalog item with the requested name
    #[error("item not found")]
    ItemNotFound,

    /// Transfer aborted by an unexpected store error
    #[error("cannot transfer coins")]
    TransferFailed,

    /// Purchase aborted by an unexpected store error
    #[error("cannot buy item")]
    PurchaseFailed,

    /// Report query failed
    #[error("cannot get report")]
    ReportFailed,

    /// Registration lost the race for a user name
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password does not match the stored credential
    #[error("wrong password")]
    WrongPassword,

    #[error("cannot create user")]
    CannotCreateUser,

    #[error("cannot get user")]
    CannotGetUser,

    #[error("cannot sign token")]
    CannotSignToken,

    /// Bearer token is malformed, expired or signed with another key
    #[error("cannot parse token")]
    InvalidToken,
}

impl DomainError {
    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBalance
                | Self::SelfTransfer
                | Self::UserNotFound
                | Self::ItemNotFound
                | Self::UserAlreadyExists
                | Self::WrongPassword
                | Self::InvalidToken
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_error() {
        let err = DomainError::InsufficientBalance;

        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "not enough balance");
    }

    #[test]
    fn test_failed_errors_are_not_client_errors() {
        assert!(!DomainError::TransferFailed.is_client_error());
        assert!(!DomainError::PurchaseFailed.is_client_error());
        assert!(!DomainError::ReportFailed.is_client_error());
    }

    #[test]
    fn test_self_transfer_message() {
        assert_eq!(
            DomainError::SelfTransfer.to_string(),
            "cannot transfer coins to yourself"
        );
    }
}
