//! Ledger store
//!
//! Cumulative transfer totals per (sender, receiver) and purchase totals
//! per (account, item). Writes are single-statement upserts; there is no
//! deduplication, so a replayed write is counted twice.

use async_trait::async_trait;
use sqlx::PgConnection;

use super::{map_update_error, StoreResult};
use crate::domain::{AccountId, Coins, ItemId, ReceivedTransfer, SentTransfer};

/// Purchased quantity of one item by one account
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PurchaseTotal {
    pub item_id: ItemId,
    pub quantity: i64,
}

/// Ledger aggregates. All methods run inside a unit of work.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Conn: Send;

    /// Add `amount` to the (sender, receiver) total, creating it if absent
    async fn record_transfer(
        &self,
        conn: &mut Self::Conn,
        sender: AccountId,
        receiver: AccountId,
        amount: Coins,
    ) -> StoreResult<()>;

    /// Add `quantity` to the (account, item) total, creating it if absent
    async fn record_purchase(
        &self,
        conn: &mut Self::Conn,
        account: AccountId,
        item: ItemId,
        quantity: i64,
    ) -> StoreResult<()>;

    /// Totals sent by `account`, ordered by receiver name
    async fn sent_by(&self, conn: &mut Self::Conn, account: AccountId) -> StoreResult<Vec<SentTransfer>>;

    /// Totals received by `account`, ordered by sender name
    async fn received_by(
        &self,
        conn: &mut Self::Conn,
        account: AccountId,
    ) -> StoreResult<Vec<ReceivedTransfer>>;

    /// Purchase totals of `account`
    async fn purchases_of(&self, conn: &mut Self::Conn, account: AccountId) -> StoreResult<Vec<PurchaseTotal>>;
}

/// PostgreSQL ledger store (`transfer_ledger`, `purchase_ledger`).
///
/// Stateless: every query runs on the unit-of-work connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgLedgerStore;

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Conn = PgConnection;

    async fn record_transfer(
        &self,
        conn: &mut PgConnection,
        sender: AccountId,
        receiver: AccountId,
        amount: Coins,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO transfer_ledger (sender_id, receiver_id, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (sender_id, receiver_id)
            DO UPDATE SET amount = transfer_ledger.amount + EXCLUDED.amount
            "#,
        )
        .bind(sender)
        .bind(receiver)
        .bind(amount.value())
        .execute(&mut *conn)
        .await
        .map_err(map_update_error)?;

        Ok(())
    }

    async fn record_purchase(
        &self,
        conn: &mut PgConnection,
        account: AccountId,
        item: ItemId,
        quantity: i64,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO purchase_ledger (account_id, item_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id, item_id)
            DO UPDATE SET quantity = purchase_ledger.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(account)
        .bind(item)
        .bind(quantity)
        .execute(&mut *conn)
        .await
        .map_err(map_update_error)?;

        Ok(())
    }

    async fn sent_by(&self, conn: &mut PgConnection, account: AccountId) -> StoreResult<Vec<SentTransfer>> {
        let rows = sqlx::query_as(
            r#"
            SELECT r.name AS to_user, t.amount
            FROM transfer_ledger t
            JOIN accounts r ON r.id = t.receiver_id
            WHERE t.sender_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(account)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }

    async fn received_by(
        &self,
        conn: &mut PgConnection,
        account: AccountId,
    ) -> StoreResult<Vec<ReceivedTransfer>> {
        let rows = sqlx::query_as(
            r#"
            SELECT s.name AS from_user, t.amount
            FROM transfer_ledger t
            JOIN accounts s ON s.id = t.sender_id
            WHERE t.receiver_id = $1
            ORDER BY s.name
            "#,
        )
        .bind(account)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }

    async fn purchases_of(&self, conn: &mut PgConnection, account: AccountId) -> StoreResult<Vec<PurchaseTotal>> {
        let rows = sqlx::query_as(
            r#"
            SELECT item_id, quantity
            FROM purchase_ledger
            WHERE account_id = $1
            ORDER BY item_id
            "#,
        )
        .bind(account)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }
}
