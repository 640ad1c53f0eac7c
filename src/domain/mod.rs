//! Domain module
//!
//! Core domain types and business errors.

pub mod coins;
pub mod context;
pub mod error;
pub mod model;
pub mod report;

pub use coins::{Coins, CoinsError};
pub use context::OperationContext;
pub use error::DomainError;
pub use model::{Account, AccountId, Item, ItemId};
pub use report::{CoinHistory, InventoryEntry, ReceivedTransfer, SentTransfer, UserReport};
