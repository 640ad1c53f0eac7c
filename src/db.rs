//! Database module
//!
//! Connectivity and schema checks run at startup. The schema itself lives
//! in `migrations/`.

use sqlx::PgPool;

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist and the catalog is seeded
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let required_tables = ["accounts", "items", "transfer_ledger", "purchase_ledger"];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables 
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    check_catalog(pool).await
}

/// Check that the merch catalog has been seeded
async fn check_catalog(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(pool)
        .await?;

    if item_count == 0 {
        tracing::error!("Catalog is empty. Please run the schema migration with its seed data.");
        return Ok(false);
    }

    tracing::info!("Catalog verified: {} items", item_count);
    Ok(true)
}
