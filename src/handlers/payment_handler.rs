//! Payment Handler
//!
//! Transfers and purchases. Each flow resolves names outside the unit of
//! work, then withdraws, credits and records the ledger aggregate inside a
//! single unit so that all effects commit together or not at all.
//!
//! No locks are taken here: the conditional withdraw in the account store
//! and the store's transaction isolation keep balances non-negative under
//! concurrent calls.

use async_trait::async_trait;

use crate::domain::{AccountId, Coins, DomainError, ItemId};
use crate::store::{
    AccountStore, CatalogStore, LedgerStore, StoreError, TransactionError, Transactor, UnitOfWork,
};

use super::{BuyItemCommand, TransferCommand};

/// Payment operations exposed to the API layer
#[async_trait]
pub trait Payments: Send + Sync {
    /// Move `amount` coins from the caller to the named account
    async fn transfer(&self, command: TransferCommand) -> Result<(), DomainError>;

    /// Buy one unit of the named item for the caller
    async fn buy_item(&self, command: BuyItemCommand) -> Result<(), DomainError>;
}

// =========================================================================
// PaymentEngine
// =========================================================================

/// Payment engine over a transactor and the three stores.
///
/// The account and ledger stores must share the transactor's connection
/// type so their mutations join the same unit of work.
#[derive(Debug, Clone)]
pub struct PaymentEngine<T, A, C, L> {
    transactor: T,
    accounts: A,
    catalog: C,
    ledger: L,
}

impl<T, A, C, L> PaymentEngine<T, A, C, L>
where
    T: Transactor,
    A: AccountStore<Conn = T::Conn>,
    C: CatalogStore,
    L: LedgerStore<Conn = T::Conn>,
{
    pub fn new(transactor: T, accounts: A, catalog: C, ledger: L) -> Self {
        Self {
            transactor,
            accounts,
            catalog,
            ledger,
        }
    }
}

#[async_trait]
impl<T, A, C, L> Payments for PaymentEngine<T, A, C, L>
where
    T: Transactor,
    A: AccountStore<Conn = T::Conn>,
    C: CatalogStore,
    L: LedgerStore<Conn = T::Conn>,
{
    async fn transfer(&self, command: TransferCommand) -> Result<(), DomainError> {
        let to = match self.accounts.find_id_by_name(&command.to_user).await {
            Ok(id) => id,
            Err(StoreError::NotFound) => return Err(DomainError::UserNotFound),
            Err(e) => return Err(unexpected("find receiver", e, DomainError::TransferFailed)),
        };

        if to == command.from {
            return Err(DomainError::SelfTransfer);
        }

        let work = TransferWork {
            accounts: &self.accounts,
            ledger: &self.ledger,
            from: command.from,
            to,
            amount: command.amount,
        };
        self.transactor
            .run(work)
            .await
            .map_err(|e| settle(e, DomainError::TransferFailed))?;

        tracing::debug!(
            from = %command.from,
            to = %to,
            amount = %command.amount,
            "Transfer committed"
        );
        Ok(())
    }

    async fn buy_item(&self, command: BuyItemCommand) -> Result<(), DomainError> {
        let item = match self.catalog.find_by_name(&command.item).await {
            Ok(item) => item,
            Err(StoreError::NotFound) => return Err(DomainError::ItemNotFound),
            Err(e) => return Err(unexpected("find item", e, DomainError::PurchaseFailed)),
        };

        let price = Coins::new(item.price).map_err(|e| {
            tracing::error!(item = %item.name, error = %e, "Catalog item has an invalid price");
            DomainError::PurchaseFailed
        })?;

        let work = PurchaseWork {
            accounts: &self.accounts,
            ledger: &self.ledger,
            account: command.account,
            item: item.id,
            price,
        };
        self.transactor
            .run(work)
            .await
            .map_err(|e| settle(e, DomainError::PurchaseFailed))?;

        tracing::debug!(
            account = %command.account,
            item = %item.name,
            price = %price,
            "Purchase committed"
        );
        Ok(())
    }
}

// =========================================================================
// Units of work
// =========================================================================

struct TransferWork<'a, A, L> {
    accounts: &'a A,
    ledger: &'a L,
    from: AccountId,
    to: AccountId,
    amount: Coins,
}

#[async_trait]
impl<'a, C, A, L> UnitOfWork<C> for TransferWork<'a, A, L>
where
    C: Send,
    A: AccountStore<Conn = C>,
    L: LedgerStore<Conn = C>,
{
    type Output = ();
    type Error = DomainError;

    async fn execute(&self, conn: &mut C) -> Result<(), DomainError> {
        // The sender has just authenticated, so a failed conditional
        // withdraw means the balance is short.
        match self.accounts.withdraw(conn, self.from, self.amount).await {
            Ok(()) => {}
            Err(StoreError::NotFound) => return Err(DomainError::InsufficientBalance),
            Err(e) => return Err(unexpected("withdraw", e, DomainError::TransferFailed)),
        }

        match self.accounts.deposit(conn, self.to, self.amount).await {
            Ok(()) => {}
            Err(StoreError::NotFound) => return Err(DomainError::UserNotFound),
            Err(e) => return Err(unexpected("deposit", e, DomainError::TransferFailed)),
        }

        self.ledger
            .record_transfer(conn, self.from, self.to, self.amount)
            .await
            .map_err(|e| unexpected("record transfer", e, DomainError::TransferFailed))
    }
}

struct PurchaseWork<'a, A, L> {
    accounts: &'a A,
    ledger: &'a L,
    account: AccountId,
    item: ItemId,
    price: Coins,
}

#[async_trait]
impl<'a, C, A, L> UnitOfWork<C> for PurchaseWork<'a, A, L>
where
    C: Send,
    A: AccountStore<Conn = C>,
    L: LedgerStore<Conn = C>,
{
    type Output = ();
    type Error = DomainError;

    async fn execute(&self, conn: &mut C) -> Result<(), DomainError> {
        match self.accounts.withdraw(conn, self.account, self.price).await {
            Ok(()) => {}
            Err(StoreError::NotFound) => return Err(DomainError::InsufficientBalance),
            Err(e) => return Err(unexpected("withdraw", e, DomainError::PurchaseFailed)),
        }

        self.ledger
            .record_purchase(conn, self.account, self.item, 1)
            .await
            .map_err(|e| unexpected("record purchase", e, DomainError::PurchaseFailed))
    }
}

/// Log an unanticipated store error and replace it with `failure`
pub(super) fn unexpected(step: &'static str, err: StoreError, failure: DomainError) -> DomainError {
    tracing::error!(step, error = %err, "Store error, aborting: {}", failure);
    failure
}

/// Flatten a transactor result into a domain error
pub(super) fn settle(err: TransactionError<DomainError>, failure: DomainError) -> DomainError {
    match err {
        TransactionError::Aborted(domain_err) => domain_err,
        TransactionError::Store(store_err) => unexpected("transaction", store_err, failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_passes_domain_errors_through() {
        let err = settle(
            TransactionError::Aborted(DomainError::InsufficientBalance),
            DomainError::TransferFailed,
        );
        assert_eq!(err, DomainError::InsufficientBalance);
    }

    #[test]
    fn test_settle_hides_store_errors() {
        let err = settle(
            TransactionError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)),
            DomainError::PurchaseFailed,
        );
        assert_eq!(err, DomainError::PurchaseFailed);
    }
}
