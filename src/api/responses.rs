use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Account, AssetType, Transaction, TransactionType};
use crate::services::BalanceSummary;

/// Error body shared by every failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<ValidationErrorDetail>) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub service: String,
    pub version: String,
    pub health: String,
}

/// Balance of one (account, asset type) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub account_id: Uuid,
    pub username: String,
    pub asset_type: String,
    pub symbol: String,
    pub balance: Decimal,
}

impl From<BalanceSummary> for BalanceResponse {
    fn from(summary: BalanceSummary) -> Self {
        Self {
            account_id: summary.account.id,
            username: summary.account.username,
            asset_type: summary.asset_type.name,
            symbol: summary.asset_type.symbol,
            balance: summary.wallet.balance,
        }
    }
}

/// One ledger entry as rendered in history pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionOut {
    pub id: Uuid,
    pub reference_id: Uuid,
    pub transaction_type: TransactionType,
    pub wallet_id: Uuid,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub description: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionOut {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            reference_id: tx.reference_id,
            transaction_type: tx.transaction_type,
            wallet_id: tx.wallet_id,
            amount: tx.amount,
            balance_after: tx.balance_after,
            description: tx.description,
            idempotency_key: tx.idempotency_key,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub account_id: Uuid,
    pub asset_type: String,
    pub transactions: Vec<TransactionOut>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetTypeOut {
    pub id: Uuid,
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<AssetType> for AssetTypeOut {
    fn from(asset: AssetType) -> Self {
        Self {
            id: asset.id,
            name: asset.name,
            symbol: asset.symbol,
            description: asset.description,
            is_active: asset.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOut {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub is_system: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountOut {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            is_system: account.is_system,
            is_active: account.is_active,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub account_id: Uuid,
    pub username: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String, account_id: Uuid, username: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            account_id,
            username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let body = ErrorResponse::new("INSUFFICIENT_FUNDS", "not enough");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "INSUFFICIENT_FUNDS");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_account_out_hides_credentials() {
        let account = Account::new_user("carol".to_string(), None, "hash".to_string());
        let out = AccountOut::from(account);
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("hash"));
    }
}
