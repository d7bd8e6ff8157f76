use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Business meaning of a ledger entry. `Refund` and `Adjustment` are part of
/// the data model but no endpoint produces them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Topup,
    Bonus,
    Spend,
    Refund,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Topup => "TOPUP",
            TransactionType::Bonus => "BONUS",
            TransactionType::Spend => "SPEND",
            TransactionType::Refund => "REFUND",
            TransactionType::Adjustment => "ADJUSTMENT",
        }
    }
}

/// One immutable ledger entry. Every business event writes exactly two:
/// a debit (negative amount) on the source wallet and a credit (positive
/// amount) on the destination wallet, sharing one `reference_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub reference_id: Uuid,
    pub transaction_type: TransactionType,
    pub wallet_id: Uuid,
    /// Signed amount: negative for debits, positive for credits.
    pub amount: Decimal,
    /// Wallet balance immediately after this entry was applied.
    pub balance_after: Decimal,
    pub description: Option<String>,
    pub idempotency_key: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a debit entry. `amount` is the positive magnitude; the stored
    /// amount is negated.
    #[allow(clippy::too_many_arguments)]
    pub fn debit(
        reference_id: Uuid,
        transaction_type: TransactionType,
        wallet_id: Uuid,
        amount: Decimal,
        balance_after: Decimal,
        description: Option<String>,
        idempotency_key: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference_id,
            transaction_type,
            wallet_id,
            amount: -amount,
            balance_after,
            description,
            idempotency_key,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Creates a credit entry with the positive amount as stored.
    #[allow(clippy::too_many_arguments)]
    pub fn credit(
        reference_id: Uuid,
        transaction_type: TransactionType,
        wallet_id: Uuid,
        amount: Decimal,
        balance_after: Decimal,
        description: Option<String>,
        idempotency_key: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference_id,
            transaction_type,
            wallet_id,
            amount,
            balance_after,
            description,
            idempotency_key,
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn is_debit(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}
