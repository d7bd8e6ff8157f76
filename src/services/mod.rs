pub mod bootstrap;
pub mod engine;
pub mod flows;
pub mod queries;

pub use engine::{MovementOutcome, MovementReceipt, WalletEngine};
pub use flows::{Direction, MovementKind, MovementRequest};
pub use queries::{BalanceSummary, HistoryPage, WalletQueries};
