//! In-memory backend
//!
//! Implements every store trait and the transactor over a single
//! `Arc<Mutex<MemoryState>>`. A unit of work holds the lock for its whole
//! run and mutates a private copy of the state, which replaces the shared
//! state only on success. That makes units serializable, and a failed or
//! cancelled unit leaves nothing behind.
//!
//! Used by the unit and HTTP tests and for running the service without a
//! database. Methods that do not take a `conn` lock the state themselves,
//! so they must not be called from inside a unit of work.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    AccountStore, CatalogStore, LedgerStore, PurchaseTotal, StoreError, StoreResult,
    TransactionError, Transactor, UnitOfWork, DEFAULT_CATALOG,
};
use crate::domain::{Account, AccountId, Coins, Item, ItemId, ReceivedTransfer, SentTransfer};

/// Initial grant for new accounts, mirrors the `accounts.balance` default
pub const INITIAL_BALANCE: i64 = 1000;

/// Whole contents of the in-memory backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryState {
    accounts: BTreeMap<AccountId, Account>,
    items: BTreeMap<ItemId, Item>,
    transfers: BTreeMap<(AccountId, AccountId), i64>,
    purchases: BTreeMap<(AccountId, ItemId), i64>,
    next_account_id: i64,
    next_item_id: i64,
}

impl MemoryState {
    /// Balance of an account, if it exists
    pub fn balance(&self, id: AccountId) -> Option<i64> {
        self.accounts.get(&id).map(|account| account.balance)
    }

    /// Cumulative amount sent from `sender` to `receiver`
    pub fn transfer_total(&self, sender: AccountId, receiver: AccountId) -> Option<i64> {
        self.transfers.get(&(sender, receiver)).copied()
    }

    /// Number of (sender, receiver) rows in the transfer ledger
    pub fn transfer_rows(&self) -> usize {
        self.transfers.len()
    }

    /// Cumulative quantity of `item` bought by `account`
    pub fn purchase_quantity(&self, account: AccountId, item: ItemId) -> Option<i64> {
        self.purchases.get(&(account, item)).copied()
    }

    /// Sum of all balances
    pub fn total_balance(&self) -> i64 {
        self.accounts.values().map(|account| account.balance).sum()
    }

    fn name_of(&self, id: AccountId) -> String {
        self.accounts
            .get(&id)
            .map(|account| account.name.clone())
            .unwrap_or_default()
    }
}

/// Connection handed to units of work: a private copy of the state
#[derive(Debug)]
pub struct MemoryConn {
    state: MemoryState,
}

/// In-memory store, cheap to clone (shared state)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store with no accounts and no items.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with [`DEFAULT_CATALOG`].
    pub async fn with_default_catalog() -> Self {
        let store = Self::new();
        for (name, price) in DEFAULT_CATALOG {
            store.add_item(name, *price).await;
        }
        store
    }

    /// Adds a catalog item and returns its id.
    pub async fn add_item(&self, name: &str, price: i64) -> ItemId {
        let mut state = self.state.lock().await;
        state.next_item_id += 1;
        let id = ItemId(state.next_item_id);
        state.items.insert(
            id,
            Item {
                id,
                name: name.to_string(),
                price,
            },
        );
        id
    }

    /// Inserts an account with an explicit balance, bypassing registration.
    pub async fn add_account(&self, name: &str, balance: i64) -> AccountId {
        let mut state = self.state.lock().await;
        Self::insert_account(&mut state, name, "", balance)
    }

    /// Copy of the current committed state.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    fn insert_account(state: &mut MemoryState, name: &str, credential: &str, balance: i64) -> AccountId {
        state.next_account_id += 1;
        let id = AccountId(state.next_account_id);
        state.accounts.insert(
            id,
            Account {
                id,
                name: name.to_string(),
                credential: credential.to_string(),
                balance,
            },
        );
        id
    }
}

#[async_trait]
impl Transactor for MemoryStore {
    type Conn = MemoryConn;

    async fn run<W>(&self, work: W) -> Result<W::Output, TransactionError<W::Error>>
    where
        W: UnitOfWork<MemoryConn>,
    {
        let mut committed = self.state.lock().await;
        let mut conn = MemoryConn {
            state: committed.clone(),
        };

        match work.execute(&mut conn).await {
            Ok(output) => {
                *committed = conn.state;
                Ok(output)
            }
            Err(err) => Err(TransactionError::Aborted(err)),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    type Conn = MemoryConn;

    async fn find_id_by_name(&self, name: &str) -> StoreResult<AccountId> {
        AccountStore::find_by_name(self, name)
            .await
            .map(|account| account.id)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Account> {
        let state = self.state.lock().await;
        state
            .accounts
            .values()
            .find(|account| account.name == name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, name: &str, credential: &str) -> StoreResult<AccountId> {
        let mut state = self.state.lock().await;
        if state.accounts.values().any(|account| account.name == name) {
            return Err(StoreError::AlreadyExists);
        }
        Ok(Self::insert_account(&mut state, name, credential, INITIAL_BALANCE))
    }

    async fn balance(&self, conn: &mut MemoryConn, id: AccountId) -> StoreResult<i64> {
        conn.state.balance(id).ok_or(StoreError::NotFound)
    }

    async fn withdraw(&self, conn: &mut MemoryConn, id: AccountId, amount: Coins) -> StoreResult<()> {
        let account = conn
            .state
            .accounts
            .get_mut(&id)
            .filter(|account| amount.is_covered_by(account.balance))
            .ok_or(StoreError::NotFound)?;
        account.balance -= amount.value();
        Ok(())
    }

    async fn deposit(&self, conn: &mut MemoryConn, id: AccountId, amount: Coins) -> StoreResult<()> {
        let account = conn.state.accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        account.balance = account
            .balance
            .checked_add(amount.value())
            .ok_or(StoreError::OutOfRange)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> StoreResult<Item> {
        let state = self.state.lock().await;
        state
            .items
            .values()
            .find(|item| item.name == name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<Item>> {
        let state = self.state.lock().await;
        Ok(state.items.values().cloned().collect())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    type Conn = MemoryConn;

    async fn record_transfer(
        &self,
        conn: &mut MemoryConn,
        sender: AccountId,
        receiver: AccountId,
        amount: Coins,
    ) -> StoreResult<()> {
        let total = conn.state.transfers.entry((sender, receiver)).or_insert(0);
        *total = total.checked_add(amount.value()).ok_or(StoreError::OutOfRange)?;
        Ok(())
    }

    async fn record_purchase(
        &self,
        conn: &mut MemoryConn,
        account: AccountId,
        item: ItemId,
        quantity: i64,
    ) -> StoreResult<()> {
        let total = conn.state.purchases.entry((account, item)).or_insert(0);
        *total = total.checked_add(quantity).ok_or(StoreError::OutOfRange)?;
        Ok(())
    }

    async fn sent_by(&self, conn: &mut MemoryConn, account: AccountId) -> StoreResult<Vec<SentTransfer>> {
        let state = &conn.state;
        let mut sent: Vec<SentTransfer> = state
            .transfers
            .iter()
            .filter(|((sender, _), _)| *sender == account)
            .map(|((_, receiver), amount)| SentTransfer {
                to_user: state.name_of(*receiver),
                amount: *amount,
            })
            .collect();
        sent.sort_by(|a, b| a.to_user.cmp(&b.to_user));
        Ok(sent)
    }

    async fn received_by(
        &self,
        conn: &mut MemoryConn,
        account: AccountId,
    ) -> StoreResult<Vec<ReceivedTransfer>> {
        let state = &conn.state;
        let mut received: Vec<ReceivedTransfer> = state
            .transfers
            .iter()
            .filter(|((_, receiver), _)| *receiver == account)
            .map(|((sender, _), amount)| ReceivedTransfer {
                from_user: state.name_of(*sender),
                amount: *amount,
            })
            .collect();
        received.sort_by(|a, b| a.from_user.cmp(&b.from_user));
        Ok(received)
    }

    async fn purchases_of(&self, conn: &mut MemoryConn, account: AccountId) -> StoreResult<Vec<PurchaseTotal>> {
        Ok(conn
            .state
            .purchases
            .iter()
            .filter(|((owner, _), _)| *owner == account)
            .map(|((_, item_id), quantity)| PurchaseTotal {
                item_id: *item_id,
                quantity: *quantity,
            })
            .collect())
    }
}
