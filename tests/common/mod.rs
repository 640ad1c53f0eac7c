//! Common test utilities

#![allow(dead_code)]

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use merch_store::auth::{PasswordHasher, TokenService};

pub const TEST_SIGN_KEY: &str = "integration-test-sign-key";
pub const TEST_SALT: &str = "integration-test-salt";

pub fn hasher() -> PasswordHasher {
    PasswordHasher::new(TEST_SALT)
}

pub fn tokens() -> TokenService {
    TokenService::new(TEST_SIGN_KEY, Duration::from_secs(3600))
}

/// Connect to the test database.
///
/// Returns `None` when `DATABASE_URL` is not set so the PostgreSQL suites
/// are skipped on machines without a database. Tests run in parallel
/// against the same schema, so they create accounts with [`unique_name`]
/// instead of truncating tables.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    Some(pool)
}

/// Account name unique across test runs
pub fn unique_name(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &suffix[..12])
}
