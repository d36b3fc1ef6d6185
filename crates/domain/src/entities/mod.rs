pub mod balance;
pub mod pool;
pub mod transaction;

// Re-export for easier access
pub use balance::{LiveBalance, TokenBalance};
pub use pool::PoolSnapshot;
pub use transaction::{StoredTransaction, TxAmounts};
