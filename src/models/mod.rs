pub mod account;
pub mod asset_type;
pub mod idempotency_key;
pub mod transaction;
pub mod wallet;

pub use account::{
    Account, SYSTEM_BONUS_POOL, SYSTEM_REVENUE, SYSTEM_TREASURY, SYSTEM_USERNAMES,
};
pub use asset_type::AssetType;
pub use idempotency_key::IdempotencyRecord;
pub use transaction::{Transaction, TransactionType};
pub use wallet::Wallet;
