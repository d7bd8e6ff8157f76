use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Application error kinds surfaced by the service layer.
/// Each variant carries the payload the API facade needs to render it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Insufficient funds: wallet has {balance} {asset_symbol}, but {requested} {asset_symbol} were requested.")]
    InsufficientFunds {
        balance: Decimal,
        requested: Decimal,
        asset_symbol: String,
    },

    #[error("No wallet found for account={account_id}, asset_type={asset_type_id}.")]
    WalletNotFound {
        account_id: Uuid,
        asset_type_id: Uuid,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Asset type not found or inactive: {0}")]
    AssetTypeNotFound(String),

    #[error("Idempotency key '{0}' was already used with a different request payload.")]
    IdempotencyConflict(String),

    /// Another request inserted the same idempotency key first. The engine
    /// retries once; the retry finds the committed record and replays it.
    #[error("Concurrent duplicate for idempotency key '{0}'.")]
    DuplicateRace(String),

    /// The store's check constraint tripped; the engine pre-check should
    /// have caught this, so reaching it indicates an invariant bug.
    #[error("Transaction rejected: wallet {wallet_id} would have a negative balance of {balance}.")]
    NegativeBalance { wallet_id: Uuid, balance: Decimal },

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Stable machine-readable code for the HTTP boundary.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            AppError::WalletNotFound { .. } => "WALLET_NOT_FOUND",
            AppError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            AppError::AssetTypeNotFound(_) => "ASSET_TYPE_NOT_FOUND",
            AppError::IdempotencyConflict(_) => "IDEMPOTENCY_CONFLICT",
            AppError::NegativeBalance { .. } => "NEGATIVE_BALANCE",
            AppError::UsernameTaken => "USERNAME_TAKEN",
            AppError::EmailTaken => "EMAIL_TAKEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::DuplicateRace(_)
            | AppError::Database(_)
            | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_message_carries_payload() {
        let err = AppError::InsufficientFunds {
            balance: dec!(500),
            requested: dec!(999999),
            asset_symbol: "GC".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500 GC"));
        assert!(msg.contains("999999 GC"));
        assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            AppError::AccountNotFound("x".to_string()).code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            AppError::IdempotencyConflict("k".to_string()).code(),
            "IDEMPOTENCY_CONFLICT"
        );
        assert_eq!(
            AppError::DuplicateRace("k".to_string()).code(),
            "INTERNAL_ERROR"
        );
    }
}
