//! Catalog store
//!
//! Read-only lookups of purchasable items.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreError, StoreResult};
use crate::domain::Item;

/// Items seeded by `migrations/001_schema.sql`, in id order.
pub const DEFAULT_CATALOG: &[(&str, i64)] = &[
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

/// Purchasable items. The catalog is immutable at runtime.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Find an item by its unique name
    async fn find_by_name(&self, name: &str) -> StoreResult<Item>;

    /// All items ordered by id
    async fn list(&self) -> StoreResult<Vec<Item>>;
}

/// PostgreSQL catalog store (`items` table)
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_by_name(&self, name: &str) -> StoreResult<Item> {
        let item: Option<Item> = sqlx::query_as("SELECT id, name, price FROM items WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        item.ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<Item>> {
        let items = sqlx::query_as("SELECT id, name, price FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_prices_positive() {
        assert!(DEFAULT_CATALOG.iter().all(|(_, price)| *price > 0));
    }

    #[test]
    fn test_default_catalog_names_unique_and_short() {
        let mut names: Vec<&str> = DEFAULT_CATALOG.iter().map(|(name, _)| *name).collect();
        assert!(names.iter().all(|name| name.len() <= 16));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DEFAULT_CATALOG.len());
    }
}
