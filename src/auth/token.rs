//! JWT tokens
//!
//! HS256 tokens carrying the account id, issued at `POST /api/auth` and
//! checked by the auth middleware.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, DomainError};

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: AccountId,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(sign_key: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(sign_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(sign_key.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for an account
    pub fn issue(&self, account_id: AccountId) -> Result<String, DomainError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            user_id: account_id,
            iat: now,
            exp: now.saturating_add(ttl),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign token");
            DomainError::CannotSignToken
        })
    }

    /// Verify a token and return the account it was issued for
    pub fn verify(&self, token: &str) -> Result<AccountId, DomainError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.user_id)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected token");
                DomainError::InvalidToken
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let tokens = TokenService::new("sign-key", Duration::from_secs(3600));
        let token = tokens.issue(AccountId(42)).unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), AccountId(42));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let issuer = TokenService::new("sign-key", Duration::from_secs(3600));
        let other = TokenService::new("other-key", Duration::from_secs(3600));
        let token = issuer.issue(AccountId(1)).unwrap();

        assert_eq!(other.verify(&token), Err(DomainError::InvalidToken));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("sign-key", Duration::from_secs(3600));
        let claims = Claims {
            user_id: AccountId(1),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"sign-key"),
        )
        .unwrap();

        assert_eq!(tokens.verify(&token), Err(DomainError::InvalidToken));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = TokenService::new("sign-key", Duration::from_secs(3600));
        assert_eq!(tokens.verify("no-token"), Err(DomainError::InvalidToken));
    }
}
