//! Store module
//!
//! Persistence boundary of the payment engine: the account, catalog and
//! ledger stores plus the transactor that runs units of work atomically.
//! Each trait has a PostgreSQL implementation and an in-memory one.

mod account;
mod catalog;
mod ledger;
pub mod memory;
mod transactor;

pub use account::{AccountStore, PgAccountStore};
pub use catalog::{CatalogStore, PgCatalogStore, DEFAULT_CATALOG};
pub use ledger::{LedgerStore, PgLedgerStore, PurchaseTotal};
pub use memory::{MemoryConn, MemoryState, MemoryStore};
pub use transactor::{PgTransactor, TransactionError, Transactor, UnitOfWork};

/// Store-level result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
///
/// `NotFound` doubles as the "conditional update matched no row" signal of
/// [`AccountStore::withdraw`]; callers give it meaning in context.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    /// An arithmetic update left the column's range
    #[error("value out of range")]
    OutOfRange,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// PostgreSQL error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL error code for numeric overflow
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Map an update error, turning numeric overflow into `OutOfRange`
pub(crate) fn map_update_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) => {
            StoreError::OutOfRange
        }
        _ => StoreError::Database(err),
    }
}

/// Map an insert error, turning unique violations into `AlreadyExists`
pub(crate) fn map_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::AlreadyExists
        }
        _ => StoreError::Database(err),
    }
}
