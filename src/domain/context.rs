//! Operation Context
//!
//! Identity and tracing metadata attached to every authenticated request.

use uuid::Uuid;

use super::AccountId;

/// Context for an authenticated operation.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Account resolved from the bearer token
    pub account_id: AccountId,

    /// Correlation ID for request tracing
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a context for the given account
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            correlation_id: None,
        }
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}
