//! User report
//!
//! Point-in-time view of an account returned by `GET /api/info`.

use serde::{Deserialize, Serialize};

/// Balance, inventory and coin history of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReport {
    pub coins: i64,
    pub inventory: Vec<InventoryEntry>,
    pub coin_history: CoinHistory,
}

/// Quantity of one catalog item owned by the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    #[serde(rename = "type")]
    pub item_name: String,
    pub quantity: i64,
}

/// Aggregated transfer totals, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    pub received: Vec<ReceivedTransfer>,
    pub sent: Vec<SentTransfer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedTransfer {
    pub from_user: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SentTransfer {
    pub to_user: String,
    pub amount: i64,
}
