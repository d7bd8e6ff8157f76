//! Development seed loader.
//!
//! Provisions the Gold Coins asset type, the three system accounts with
//! their wallets, and a demo user. Safe to run repeatedly: existing rows
//! keep their balances.

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;
use wallet_service::auth::hash_password;
use wallet_service::config::Settings;
use wallet_service::models::{Account, SYSTEM_BONUS_POOL, SYSTEM_REVENUE, SYSTEM_TREASURY};
use wallet_service::observability::{init_logging, LogConfig};
use wallet_service::services::bootstrap;

const SYSTEM_POOL_BALANCE: i64 = 99_999_999;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let settings = Settings::new()?;
    init_logging(&LogConfig {
        directives: settings.log_directives(),
        ..LogConfig::default()
    });

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let gc = bootstrap::ensure_asset_type(&pool, "Gold Coins", "GC").await?;
    info!(asset = %gc.symbol, "asset type ready");

    for (username, opening_balance) in [
        (SYSTEM_TREASURY, Decimal::from(SYSTEM_POOL_BALANCE)),
        (SYSTEM_BONUS_POOL, Decimal::from(SYSTEM_POOL_BALANCE)),
        (SYSTEM_REVENUE, Decimal::ZERO),
    ] {
        let account = bootstrap::ensure_account(&pool, Account::new_system(username)).await?;
        let wallet = bootstrap::ensure_wallet(&pool, account.id, gc.id, opening_balance).await?;
        info!(%username, balance = %wallet.balance, "system account ready");
    }

    let alice = bootstrap::ensure_account(
        &pool,
        Account::new_user(
            "alice".to_string(),
            Some("alice@example.com".to_string()),
            hash_password("password123")?,
        ),
    )
    .await?;
    let alice_wallet = bootstrap::ensure_wallet(&pool, alice.id, gc.id, Decimal::from(500)).await?;
    info!(username = %alice.username, balance = %alice_wallet.balance, "demo user ready");

    info!("Seed complete");
    Ok(())
}
