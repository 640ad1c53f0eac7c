//! Account store
//!
//! Account creation, lookups and the two balance mutations.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::{map_insert_error, map_update_error, StoreError, StoreResult};
use crate::domain::{Account, AccountId, Coins};

/// Accounts and their balances.
///
/// Lookups and `create` run outside any unit of work. `withdraw`,
/// `deposit` and `balance` take the connection of the active unit.
#[async_trait]
pub trait AccountStore: Send + Sync {
    type Conn: Send;

    /// Resolve an account name to its id
    async fn find_id_by_name(&self, name: &str) -> StoreResult<AccountId>;

    /// Load a full account by name
    async fn find_by_name(&self, name: &str) -> StoreResult<Account>;

    /// Insert a new account with the initial balance.
    ///
    /// Returns `AlreadyExists` when the name is taken; the uniqueness
    /// constraint decides, there is no pre-check.
    async fn create(&self, name: &str, credential: &str) -> StoreResult<AccountId>;

    /// Current balance of an account
    async fn balance(&self, conn: &mut Self::Conn, id: AccountId) -> StoreResult<i64>;

    /// Decrement the balance only if it covers `amount`.
    ///
    /// A missing account and a short balance both yield `NotFound`.
    async fn withdraw(&self, conn: &mut Self::Conn, id: AccountId, amount: Coins) -> StoreResult<()>;

    /// Increment the balance; `NotFound` if the account does not exist,
    /// `OutOfRange` if the balance would overflow
    async fn deposit(&self, conn: &mut Self::Conn, id: AccountId, amount: Coins) -> StoreResult<()>;
}

/// PostgreSQL account store (`accounts` table)
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    type Conn = PgConnection;

    async fn find_id_by_name(&self, name: &str) -> StoreResult<AccountId> {
        let id: Option<AccountId> = sqlx::query_scalar("SELECT id FROM accounts WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        id.ok_or(StoreError::NotFound)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Account> {
        let account: Option<Account> = sqlx::query_as(
            r#"
            SELECT id, name, credential, balance
            FROM accounts
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        account.ok_or(StoreError::NotFound)
    }

    async fn create(&self, name: &str, credential: &str) -> StoreResult<AccountId> {
        sqlx::query_scalar(
            r#"
            INSERT INTO accounts (name, credential)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(credential)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn balance(&self, conn: &mut PgConnection, id: AccountId) -> StoreResult<i64> {
        let balance: Option<i64> = sqlx::query_scalar("SELECT balance FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        balance.ok_or(StoreError::NotFound)
    }

    async fn withdraw(&self, conn: &mut PgConnection, id: AccountId, amount: Coins) -> StoreResult<()> {
        // Compare-and-decrement in one statement; concurrent withdrawals
        // re-evaluate the predicate against the committed row.
        let rows_affected = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance - $2
            WHERE id = $1 AND balance >= $2
            "#,
        )
        .bind(id)
        .bind(amount.value())
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn deposit(&self, conn: &mut PgConnection, id: AccountId, amount: Coins) -> StoreResult<()> {
        let rows_affected = sqlx::query("UPDATE accounts SET balance = balance + $2 WHERE id = $1")
            .bind(id)
            .bind(amount.value())
            .execute(&mut *conn)
            .await
            .map_err(map_update_error)?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
