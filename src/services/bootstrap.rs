use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Account, AssetType, Wallet, SYSTEM_USERNAMES};
use crate::repositories::{AccountRepository, AssetTypeRepository, WalletRepository};

/// Confirms every well-known system account exists, is active, and holds a
/// wallet for each active asset type. Their absence is a configuration
/// error the server must not start with.
pub async fn verify_system_accounts(pool: &PgPool) -> Result<()> {
    let accounts = AccountRepository::new(pool.clone());
    let asset_types = AssetTypeRepository::new(pool.clone());
    let wallets = WalletRepository::new(pool.clone());

    let active_assets = asset_types.list_active().await?;

    for username in SYSTEM_USERNAMES {
        let account = accounts
            .find_by_username(username)
            .await?
            .filter(|a| a.is_system && a.is_active)
            .ok_or_else(|| AppError::AccountNotFound(format!("system:{username}")))?;

        for asset in &active_assets {
            wallets
                .find_by_account_and_asset(account.id, asset.id)
                .await?
                .ok_or(AppError::WalletNotFound {
                    account_id: account.id,
                    asset_type_id: asset.id,
                })?;
        }
    }

    Ok(())
}

/// Finds the asset type by symbol or creates it. Safe to race: the loser of
/// a concurrent insert falls back to the winner's row.
pub async fn ensure_asset_type(pool: &PgPool, name: &str, symbol: &str) -> Result<AssetType> {
    let asset_types = AssetTypeRepository::new(pool.clone());

    if let Some(existing) = asset_types.find_by_symbol(symbol).await? {
        return Ok(existing);
    }
    match asset_types
        .create(&AssetType::new(name.to_string(), symbol.to_string()))
        .await
    {
        Ok(created) => Ok(created),
        Err(AppError::Database(sqlx::Error::Database(db))) if db.is_unique_violation() => {
            asset_types
                .find_by_symbol(symbol)
                .await?
                .ok_or_else(|| AppError::AssetTypeNotFound(symbol.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// Finds the account by username or inserts the given one.
pub async fn ensure_account(pool: &PgPool, account: Account) -> Result<Account> {
    let accounts = AccountRepository::new(pool.clone());

    if let Some(existing) = accounts.find_by_username(&account.username).await? {
        return Ok(existing);
    }
    match accounts.create(&account).await {
        Ok(created) => Ok(created),
        Err(AppError::Database(sqlx::Error::Database(db))) if db.is_unique_violation() => {
            let username = account.username.clone();
            accounts
                .find_by_username(&username)
                .await?
                .ok_or(AppError::AccountNotFound(username))
        }
        Err(e) => Err(e),
    }
}

/// Finds the (account, asset) wallet or creates it with the given opening
/// balance. Existing wallets keep their balance.
pub async fn ensure_wallet(
    pool: &PgPool,
    account_id: Uuid,
    asset_type_id: Uuid,
    opening_balance: Decimal,
) -> Result<Wallet> {
    let wallets = WalletRepository::new(pool.clone());

    if let Some(existing) = wallets
        .find_by_account_and_asset(account_id, asset_type_id)
        .await?
    {
        return Ok(existing);
    }
    match wallets
        .create(&Wallet::new(account_id, asset_type_id).with_balance(opening_balance))
        .await
    {
        Ok(created) => Ok(created),
        Err(AppError::Database(sqlx::Error::Database(db))) if db.is_unique_violation() => wallets
            .find_by_account_and_asset(account_id, asset_type_id)
            .await?
            .ok_or(AppError::WalletNotFound {
                account_id,
                asset_type_id,
            }),
        Err(e) => Err(e),
    }
}
