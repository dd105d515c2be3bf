//! Types that represent the core data model: `Amount`, `Transaction` and `Transactions`.
mod amount;
mod transaction;

pub use amount::{Amount, AmountError};
pub use transaction::{Transaction, Transactions};
