pub mod store;

pub use store::{IdempotencyLookup, IdempotencyStore};
