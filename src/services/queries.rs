use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Account, AssetType, Transaction, Wallet};
use crate::repositories::{
    AccountRepository, AssetTypeRepository, TransactionRepository, WalletRepository,
};

/// A wallet balance with the account and asset context the API renders.
#[derive(Debug, Clone)]
pub struct BalanceSummary {
    pub wallet: Wallet,
    pub account: Account,
    pub asset_type: AssetType,
}

/// One page of a wallet's history, newest first, with the total row count.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub asset_type: AssetType,
}

/// Read-side queries. These take no locks; they observe whatever the engine
/// last committed.
pub struct WalletQueries {
    accounts: AccountRepository,
    asset_types: AssetTypeRepository,
    wallets: WalletRepository,
    transactions: TransactionRepository,
}

impl WalletQueries {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            asset_types: AssetTypeRepository::new(pool.clone()),
            wallets: WalletRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool),
        }
    }

    pub async fn get_balance(
        &self,
        account_id: Uuid,
        asset_type_id: Uuid,
    ) -> Result<BalanceSummary> {
        let account = self.active_account(account_id).await?;
        let asset_type = self.active_asset_type(asset_type_id).await?;

        let wallet = self
            .wallets
            .find_by_account_and_asset(account_id, asset_type_id)
            .await?
            .ok_or(AppError::WalletNotFound {
                account_id,
                asset_type_id,
            })?;

        Ok(BalanceSummary {
            wallet,
            account,
            asset_type,
        })
    }

    pub async fn get_transaction_history(
        &self,
        account_id: Uuid,
        asset_type_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<HistoryPage> {
        let _ = self.active_account(account_id).await?;
        let asset_type = self.active_asset_type(asset_type_id).await?;

        let wallet = self
            .wallets
            .find_by_account_and_asset(account_id, asset_type_id)
            .await?
            .ok_or(AppError::WalletNotFound {
                account_id,
                asset_type_id,
            })?;

        let total = self.transactions.count_for_wallet(wallet.id).await?;
        let transactions = self
            .transactions
            .list_for_wallet(wallet.id, limit, offset)
            .await?;

        Ok(HistoryPage {
            transactions,
            total,
            asset_type,
        })
    }

    pub async fn list_asset_types(&self) -> Result<Vec<AssetType>> {
        self.asset_types.list_active().await
    }

    pub async fn list_accounts(&self, include_system: bool) -> Result<Vec<Account>> {
        self.accounts.list_active(include_system).await
    }

    async fn active_account(&self, account_id: Uuid) -> Result<Account> {
        match self.accounts.find_by_id(account_id).await? {
            Some(account) if account.is_active => Ok(account),
            _ => Err(AppError::AccountNotFound(account_id.to_string())),
        }
    }

    async fn active_asset_type(&self, asset_type_id: Uuid) -> Result<AssetType> {
        match self.asset_types.find_by_id(asset_type_id).await? {
            Some(asset) if asset.is_active => Ok(asset),
            _ => Err(AppError::AssetTypeNotFound(asset_type_id.to_string())),
        }
    }
}
