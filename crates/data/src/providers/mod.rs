//! External HTTP providers.

mod balance_provider;

pub use balance_provider::HttpBalanceReader;
