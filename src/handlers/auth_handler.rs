//! Auth Handler
//!
//! Login with implicit registration: an unknown user name is registered
//! on the spot with the given password and the initial coin grant.

use async_trait::async_trait;

use crate::auth::{PasswordHasher, TokenService};
use crate::domain::{AccountId, DomainError};
use crate::store::{AccountStore, StoreError};

use super::AuthenticateCommand;

/// Authentication exposed to the API layer
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Log in (or register) and return a bearer token
    async fn authenticate(&self, command: AuthenticateCommand) -> Result<String, DomainError>;

    /// Resolve a bearer token to its account
    fn verify_token(&self, token: &str) -> Result<AccountId, DomainError>;
}

/// Authenticator over an account store
#[derive(Debug, Clone)]
pub struct AuthService<A> {
    accounts: A,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl<A: AccountStore> AuthService<A> {
    pub fn new(accounts: A, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
        }
    }

    async fn register(&self, command: &AuthenticateCommand) -> Result<AccountId, DomainError> {
        let credential = self.hasher.hash(&command.password);
        match self.accounts.create(&command.username, &credential).await {
            Ok(id) => {
                tracing::info!(account = %id, username = %command.username, "Registered account");
                Ok(id)
            }
            Err(StoreError::AlreadyExists) => Err(DomainError::UserAlreadyExists),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create account");
                Err(DomainError::CannotCreateUser)
            }
        }
    }
}

#[async_trait]
impl<A: AccountStore> Authenticator for AuthService<A> {
    async fn authenticate(&self, command: AuthenticateCommand) -> Result<String, DomainError> {
        let account_id = match self.accounts.find_by_name(&command.username).await {
            Ok(account) => {
                if !self.hasher.verify(&command.password, &account.credential) {
                    return Err(DomainError::WrongPassword);
                }
                account.id
            }
            Err(StoreError::NotFound) => self.register(&command).await?,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load account");
                return Err(DomainError::CannotGetUser);
            }
        };

        self.tokens.issue(account_id)
    }

    fn verify_token(&self, token: &str) -> Result<AccountId, DomainError> {
        self.tokens.verify(token)
    }
}
