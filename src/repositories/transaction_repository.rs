use crate::error::Result;
use crate::models::Transaction;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for ledger entries. Entries are append-only; the engine writes
/// them inside its transaction, so this repository only reads.
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pages a wallet's history, newest first.
    pub async fn list_for_wallet(
        &self,
        wallet_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, reference_id, transaction_type, wallet_id, amount, balance_after,
                   description, idempotency_key, metadata, created_at
            FROM transactions
            WHERE wallet_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(wallet_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_for_wallet(&self, wallet_id: Uuid) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM transactions WHERE wallet_id = $1
            "#,
        )
        .bind(wallet_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Both entries of one business event.
    pub async fn find_by_reference(&self, reference_id: Uuid) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, reference_id, transaction_type, wallet_id, amount, balance_after,
                   description, idempotency_key, metadata, created_at
            FROM transactions
            WHERE reference_id = $1
            ORDER BY amount
            "#,
        )
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
