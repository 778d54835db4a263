//! Kernel module - request scope, transactions and test doubles.

pub mod scope;
pub mod test_dependencies;
pub mod transaction;

pub use scope::{Scope, ScopeKey};
pub use transaction::{
    current_transaction, IsolationLevel, Outcome, StorageTransaction, TransactionBoundary,
    TransactionError, TransactionGuard, TransactionHandle, TransactionOpener, TRANSACTION,
};
