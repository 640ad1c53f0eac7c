//! Report Handler
//!
//! Builds the `GET /api/info` view. Balance, purchases and transfer
//! history are read inside one unit of work so they describe the same
//! point in time; the catalog is immutable and is read outside it.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{AccountId, CoinHistory, DomainError, InventoryEntry, UserReport};
use crate::store::{AccountStore, CatalogStore, LedgerStore, PurchaseTotal, StoreError, Transactor, UnitOfWork};

use super::payment_handler::{settle, unexpected};

/// Report queries exposed to the API layer
#[async_trait]
pub trait Reports: Send + Sync {
    async fn get_report(&self, account: AccountId) -> Result<UserReport, DomainError>;
}

/// Read-only assembler over the same stores as the payment engine
#[derive(Debug, Clone)]
pub struct ReportAssembler<T, A, C, L> {
    transactor: T,
    accounts: A,
    catalog: C,
    ledger: L,
}

impl<T, A, C, L> ReportAssembler<T, A, C, L>
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
impl<T, A, C, L> Reports for ReportAssembler<T, A, C, L>
where
    T: Transactor,
    A: AccountStore<Conn = T::Conn>,
    C: CatalogStore,
    L: LedgerStore<Conn = T::Conn>,
{
    async fn get_report(&self, account: AccountId) -> Result<UserReport, DomainError> {
        let work = ReportWork {
            accounts: &self.accounts,
            ledger: &self.ledger,
            account,
        };
        let snapshot = self
            .transactor
            .run(work)
            .await
            .map_err(|e| settle(e, DomainError::ReportFailed))?;

        let items = self
            .catalog
            .list()
            .await
            .map_err(|e| unexpected("list catalog", e, DomainError::ReportFailed))?;

        // Every catalog item is listed, with 0 for items never bought
        let owned: HashMap<_, _> = snapshot
            .purchases
            .iter()
            .map(|total| (total.item_id, total.quantity))
            .collect();
        let inventory = items
            .into_iter()
            .map(|item| InventoryEntry {
                quantity: owned.get(&item.id).copied().unwrap_or(0),
                item_name: item.name,
            })
            .collect();

        Ok(UserReport {
            coins: snapshot.balance,
            inventory,
            coin_history: snapshot.history,
        })
    }
}

struct ReportSnapshot {
    balance: i64,
    purchases: Vec<PurchaseTotal>,
    history: CoinHistory,
}

struct ReportWork<'a, A, L> {
    accounts: &'a A,
    ledger: &'a L,
    account: AccountId,
}

#[async_trait]
impl<'a, C, A, L> UnitOfWork<C> for ReportWork<'a, A, L>
where
    C: Send,
    A: AccountStore<Conn = C>,
    L: LedgerStore<Conn = C>,
{
    type Output = ReportSnapshot;
    type Error = DomainError;

    async fn execute(&self, conn: &mut C) -> Result<ReportSnapshot, DomainError> {
        let balance = match self.accounts.balance(conn, self.account).await {
            Ok(balance) => balance,
            Err(StoreError::NotFound) => return Err(DomainError::UserNotFound),
            Err(e) => return Err(unexpected("read balance", e, DomainError::ReportFailed)),
        };

        let purchases = self
            .ledger
            .purchases_of(conn, self.account)
            .await
            .map_err(|e| unexpected("read purchases", e, DomainError::ReportFailed))?;
        let sent = self
            .ledger
            .sent_by(conn, self.account)
            .await
            .map_err(|e| unexpected("read sent", e, DomainError::ReportFailed))?;
        let received = self
            .ledger
            .received_by(conn, self.account)
            .await
            .map_err(|e| unexpected("read received", e, DomainError::ReportFailed))?;

        Ok(ReportSnapshot {
            balance,
            purchases,
            history: CoinHistory { received, sent },
        })
    }
}
