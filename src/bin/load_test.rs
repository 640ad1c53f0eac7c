//! Load Testing Tool
//!
//! Fires concurrent transfers between freshly registered accounts and then
//! checks that no balance went negative and that no coins were created or
//! lost.
//!
//! Run with: cargo run --bin load_test --release -- --accounts 20 --transfers 2000

use std::sync::Arc;
use std::time::Instant;

use sqlx::postgres::PgPoolOptions;
use tokio::task::JoinSet;

use merch_store::domain::{AccountId, Coins, DomainError};
use merch_store::handlers::{PaymentEngine, Payments, TransferCommand};
use merch_store::store::{AccountStore, PgAccountStore, PgCatalogStore, PgLedgerStore, PgTransactor};

fn arg(args: &[String], name: &str, default: u64) -> u64 {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let account_count = arg(&args, "--accounts", 20).max(2) as usize;
    let transfer_count = arg(&args, "--transfers", 2000);

    let database_url = std::env::var("DATABASE_URL")?;

    println!(
        "Load Test - {} transfers across {} accounts",
        transfer_count, account_count
    );
    println!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await?;

    let accounts = PgAccountStore::new(pool.clone());
    let run = uuid::Uuid::new_v4().simple().to_string();

    let mut ids: Vec<AccountId> = Vec::with_capacity(account_count);
    let mut names: Vec<String> = Vec::with_capacity(account_count);
    for i in 0..account_count {
        let name = format!("load_{}_{}", &run[..8], i);
        ids.push(accounts.create(&name, "load-test").await?);
        names.push(name);
    }

    let raw_ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
    let total_before = total_balance(&pool, &raw_ids).await?;

    let engine = Arc::new(PaymentEngine::new(
        PgTransactor::new(pool.clone()),
        accounts,
        PgCatalogStore::new(pool.clone()),
        PgLedgerStore,
    ));
    let names = Arc::new(names);

    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for i in 0..transfer_count {
        let engine = engine.clone();
        let names = names.clone();
        let from = ids[(i as usize) % account_count];
        let to = (i as usize * 7 + 1) % account_count;
        let amount = Coins::new((i % 97 + 1) as i64)?;

        tasks.spawn(async move {
            engine
                .transfer(TransferCommand::new(from, names[to].clone(), amount))
                .await
        });
    }

    let mut succeeded = 0u64;
    let mut insufficient = 0u64;
    let mut rejected = 0u64;
    let mut failed = 0u64;

    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(()) => succeeded += 1,
            Err(DomainError::InsufficientBalance) => insufficient += 1,
            Err(DomainError::SelfTransfer) => rejected += 1,
            Err(_) => failed += 1,
        }
    }

    let elapsed = start.elapsed();
    let rate = transfer_count as f64 / elapsed.as_secs_f64();

    let total_after = total_balance(&pool, &raw_ids).await?;
    let lowest: i64 = sqlx::query_scalar("SELECT MIN(balance) FROM accounts WHERE id = ANY($1)")
        .bind(&raw_ids)
        .fetch_one(&pool)
        .await?;

    println!("\n=== Load Test Results ===");
    println!("Total transfers: {}", transfer_count);
    println!("Successful: {}", succeeded);
    println!("Insufficient balance: {}", insufficient);
    println!("Self transfers: {}", rejected);
    println!("Failed: {}", failed);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} transfers/sec", rate);
    println!("Coins before: {} after: {}", total_before, total_after);
    println!("Lowest balance: {}", lowest);

    pool.close().await;

    if lowest < 0 {
        anyhow::bail!("negative balance observed: {}", lowest);
    }
    if total_before != total_after {
        anyhow::bail!(
            "coins not conserved: {} before, {} after",
            total_before,
            total_after
        );
    }

    println!("Invariants hold.");
    Ok(())
}

async fn total_balance(pool: &sqlx::PgPool, ids: &[i64]) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COALESCE(SUM(balance), 0)::BIGINT FROM accounts WHERE id = ANY($1)")
        .bind(ids)
        .fetch_one(pool)
        .await
}
