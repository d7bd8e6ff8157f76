pub mod account_repository;
pub mod asset_type_repository;
pub mod transaction_repository;
pub mod wallet_repository;

pub use account_repository::AccountRepository;
pub use asset_type_repository::AssetTypeRepository;
pub use transaction_repository::TransactionRepository;
pub use wallet_repository::WalletRepository;
