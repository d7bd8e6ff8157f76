use crate::error::Result;
use crate::models::Wallet;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for wallet rows. Read paths only; mutations go through the
/// engine, which holds row locks for the duration of its transaction.
pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, wallet: &Wallet) -> Result<Wallet> {
        let row = sqlx::query_as::<_, Wallet>(
            r#"
            INSERT INTO wallets (id, account_id, asset_type_id, balance, version, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, account_id, asset_type_id, balance, version, updated_at
            "#,
        )
        .bind(wallet.id)
        .bind(wallet.account_id)
        .bind(wallet.asset_type_id)
        .bind(wallet.balance)
        .bind(wallet.version)
        .bind(wallet.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_account_and_asset(
        &self,
        account_id: Uuid,
        asset_type_id: Uuid,
    ) -> Result<Option<Wallet>> {
        let row = sqlx::query_as::<_, Wallet>(
            r#"
            SELECT id, account_id, asset_type_id, balance, version, updated_at
            FROM wallets
            WHERE account_id = $1 AND asset_type_id = $2
            "#,
        )
        .bind(account_id)
        .bind(asset_type_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
