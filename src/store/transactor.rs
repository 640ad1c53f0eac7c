//! Transaction coordinator
//!
//! A unit of work is a value implementing [`UnitOfWork`]; a [`Transactor`]
//! executes it against a single connection and commits only when it
//! succeeds. Nested runs are not supported.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::StoreError;

/// Work that must be applied all-or-nothing.
///
/// `C` is the connection type of the transactor running the work; store
/// mutations inside `execute` go through it.
#[async_trait]
pub trait UnitOfWork<C: Send>: Send + Sync {
    type Output: Send;
    type Error: Send;

    async fn execute(&self, conn: &mut C) -> Result<Self::Output, Self::Error>;
}

/// Runs units of work atomically.
///
/// If the work fails, every mutation made through `conn` is rolled back and
/// the error comes back as [`TransactionError::Aborted`]. Dropping the
/// returned future before completion also rolls back.
#[async_trait]
pub trait Transactor: Send + Sync {
    type Conn: Send;

    async fn run<W>(&self, work: W) -> Result<W::Output, TransactionError<W::Error>>
    where
        W: UnitOfWork<Self::Conn>;
}

/// Error returned by [`Transactor::run`]
#[derive(Debug, thiserror::Error)]
pub enum TransactionError<E> {
    /// The unit of work returned an error; nothing was committed
    #[error("unit of work aborted: {0}")]
    Aborted(E),

    /// Begin or commit failed
    #[error("transaction failed: {0}")]
    Store(StoreError),
}

// =========================================================================
// PostgreSQL
// =========================================================================

/// Transactor over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgTransactor {
    pool: PgPool,
    snapshot: bool,
}

impl PgTransactor {
    /// Transactor with the server's default isolation (read committed)
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            snapshot: false,
        }
    }

    /// Transactor whose units see a single read-only snapshot
    /// (repeatable read). Used by the report path.
    pub fn read_only_snapshot(pool: PgPool) -> Self {
        Self {
            pool,
            snapshot: true,
        }
    }
}

#[async_trait]
impl Transactor for PgTransactor {
    type Conn = PgConnection;

    async fn run<W>(&self, work: W) -> Result<W::Output, TransactionError<W::Error>>
    where
        W: UnitOfWork<PgConnection>,
    {
        // sqlx rolls the transaction back when `tx` is dropped uncommitted,
        // which covers cancellation of this future.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TransactionError::Store(e.into()))?;

        if self.snapshot {
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(|e| TransactionError::Store(e.into()))?;
        }

        match work.execute(&mut *tx).await {
            Ok(output) => {
                tx.commit()
                    .await
                    .map_err(|e| TransactionError::Store(e.into()))?;
                Ok(output)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(TransactionError::Aborted(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_error_display() {
        let err: TransactionError<String> = TransactionError::Aborted("boom".to_string());
        assert_eq!(err.to_string(), "unit of work aborted: boom");

        let err: TransactionError<String> = TransactionError::Store(StoreError::NotFound);
        assert_eq!(err.to_string(), "transaction failed: record not found");
    }
}
