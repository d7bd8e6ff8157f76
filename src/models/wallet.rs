use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The running balance of one (account, asset type) pair.
///
/// Exactly one row exists per pair. The store enforces `balance >= 0` with a
/// check constraint; `version` increases by one on every applied movement so
/// audits can detect lost updates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub account_id: Uuid,
    pub asset_type_id: Uuid,
    pub balance: Decimal,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(account_id: Uuid, asset_type_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            asset_type_id,
            balance: Decimal::ZERO,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    pub fn has_sufficient_funds(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_wallet_starts_empty() {
        let wallet = Wallet::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(wallet.balance, Decimal::ZERO);
        assert_eq!(wallet.version, 0);
    }

    #[test]
    fn test_sufficient_funds_boundary() {
        let wallet = Wallet::new(Uuid::new_v4(), Uuid::new_v4()).with_balance(dec!(50));
        assert!(wallet.has_sufficient_funds(dec!(50)));
        assert!(wallet.has_sufficient_funds(dec!(49.9999)));
        assert!(!wallet.has_sufficient_funds(dec!(50.0001)));
    }
}
