//! Per-operation transaction demarcation.
//!
//! Every top-level GraphQL operation runs inside exactly one storage
//! transaction. [`TransactionBoundary::begin`] opens it and binds the handle
//! into the operation's root [`Scope`]; [`TransactionBoundary::finish`]
//! closes it once. Resolvers only ever read the handle out of the scope and
//! serialize their work on the handle's own lock.
//!
//! If the operation future is dropped before `finish` (client went away),
//! the last handle clone drops the underlying sqlx transaction, which rolls
//! back on drop.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use super::scope::{Scope, ScopeKey};

/// Scope slot holding the operation's transaction.
pub const TRANSACTION: ScopeKey<TransactionHandle> = ScopeKey::new("transaction");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    /// Statement issued as the first statement of a new transaction.
    pub fn set_statement(&self) -> &'static str {
        match self {
            Self::ReadUncommitted => "SET TRANSACTION ISOLATION LEVEL READ UNCOMMITTED",
            Self::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            Self::RepeatableRead => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            Self::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadUncommitted => "read uncommitted",
            Self::ReadCommitted => "read committed",
            Self::RepeatableRead => "repeatable read",
            Self::Serializable => "serializable",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("failed to open transaction: {0}")]
    Open(#[source] sqlx::Error),

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("failed to roll back transaction: {0}")]
    Rollback(#[source] sqlx::Error),

    #[error("transaction already closed")]
    AlreadyClosed,

    #[error("no active transaction in scope")]
    NotActive,

    #[error("a transaction is already active for this operation")]
    Nested,

    #[error("transaction has no SQL connection")]
    NoConnection,
}

/// How an operation's transaction is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Commit,
    Rollback,
}

// =============================================================================
// Storage seam
// =============================================================================

/// A live storage transaction.
#[async_trait]
pub trait StorageTransaction: Send {
    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error>;

    async fn rollback(self: Box<Self>) -> Result<(), sqlx::Error>;

    /// SQL connection for resolvers, if the backend has one.
    fn connection(&mut self) -> Option<&mut PgConnection>;
}

/// Opens storage transactions at a given isolation level.
#[async_trait]
pub trait TransactionOpener: Send + Sync {
    async fn begin(
        &self,
        isolation: IsolationLevel,
    ) -> Result<Box<dyn StorageTransaction>, sqlx::Error>;
}

#[async_trait]
impl StorageTransaction for Transaction<'static, Postgres> {
    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        Transaction::commit(*self).await
    }

    async fn rollback(self: Box<Self>) -> Result<(), sqlx::Error> {
        Transaction::rollback(*self).await
    }

    fn connection(&mut self) -> Option<&mut PgConnection> {
        Some(&mut **self)
    }
}

#[async_trait]
impl TransactionOpener for PgPool {
    async fn begin(
        &self,
        isolation: IsolationLevel,
    ) -> Result<Box<dyn StorageTransaction>, sqlx::Error> {
        let mut tx = sqlx::Pool::begin(self).await?;
        sqlx::query(isolation.set_statement())
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(tx))
    }
}

// =============================================================================
// Handle
// =============================================================================

struct HandleInner {
    id: Uuid,
    isolation: IsolationLevel,
    slot: Mutex<Option<Box<dyn StorageTransaction>>>,
}

/// Shared reference to the operation's transaction.
///
/// Cloning is cheap; all clones refer to the same storage transaction.
#[derive(Clone)]
pub struct TransactionHandle {
    inner: Arc<HandleInner>,
}

impl TransactionHandle {
    fn new(tx: Box<dyn StorageTransaction>, isolation: IsolationLevel) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: Uuid::new_v4(),
                isolation,
                slot: Mutex::new(Some(tx)),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.inner.isolation
    }

    /// Exclusive access to the transaction until the guard drops.
    pub async fn lock(&self) -> TransactionGuard<'_> {
        TransactionGuard {
            slot: self.inner.slot.lock().await,
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.slot.lock().await.is_none()
    }

    async fn close(&self, outcome: Outcome) -> Result<(), TransactionError> {
        let tx = self
            .inner
            .slot
            .lock()
            .await
            .take()
            .ok_or(TransactionError::AlreadyClosed)?;

        match outcome {
            Outcome::Commit => tx.commit().await.map_err(TransactionError::Commit),
            Outcome::Rollback => tx.rollback().await.map_err(TransactionError::Rollback),
        }
    }
}

impl fmt::Debug for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionHandle")
            .field("id", &self.inner.id)
            .field("isolation", &self.inner.isolation)
            .finish()
    }
}

pub struct TransactionGuard<'a> {
    slot: MutexGuard<'a, Option<Box<dyn StorageTransaction>>>,
}

impl TransactionGuard<'_> {
    pub fn connection(&mut self) -> Result<&mut PgConnection, TransactionError> {
        self.slot
            .as_mut()
            .ok_or(TransactionError::AlreadyClosed)?
            .connection()
            .ok_or(TransactionError::NoConnection)
    }
}

/// Transaction bound to the current scope.
pub fn current_transaction(scope: &Scope) -> Result<&TransactionHandle, TransactionError> {
    scope.get(&TRANSACTION).ok_or(TransactionError::NotActive)
}

// =============================================================================
// Boundary manager
// =============================================================================

/// Brackets one operation with one transaction.
#[derive(Clone)]
pub struct TransactionBoundary {
    opener: Arc<dyn TransactionOpener>,
    isolation: IsolationLevel,
}

impl TransactionBoundary {
    /// Boundary opening transactions at read committed.
    pub fn new(opener: Arc<dyn TransactionOpener>) -> Self {
        Self {
            opener,
            isolation: IsolationLevel::ReadCommitted,
        }
    }

    pub fn with_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    /// Open the operation's transaction and derive a scope carrying it.
    pub async fn begin(
        &self,
        scope: &Scope,
    ) -> Result<(Scope, TransactionHandle), TransactionError> {
        if scope.contains(&TRANSACTION) {
            return Err(TransactionError::Nested);
        }

        let tx = self
            .opener
            .begin(self.isolation)
            .await
            .map_err(TransactionError::Open)?;
        let handle = TransactionHandle::new(tx, self.isolation);

        debug!(
            transaction_id = %handle.id(),
            isolation = %self.isolation,
            "Transaction opened"
        );

        Ok((scope.with(&TRANSACTION, handle.clone()), handle))
    }

    /// Close the transaction. Fails if it was already closed.
    pub async fn finish(
        &self,
        handle: &TransactionHandle,
        outcome: Outcome,
    ) -> Result<(), TransactionError> {
        let result = handle.close(outcome).await;

        match &result {
            Ok(()) => debug!(transaction_id = %handle.id(), ?outcome, "Transaction closed"),
            Err(e) => warn!(
                transaction_id = %handle.id(),
                ?outcome,
                error = %e,
                "Transaction close failed"
            ),
        }

        result
    }

    /// Run `body` inside a fresh transaction, closing it with the outcome
    /// the body reports.
    pub async fn run<T, F, Fut>(&self, scope: &Scope, body: F) -> Result<T, TransactionError>
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = (T, Outcome)>,
    {
        let (scope, handle) = self.begin(scope).await?;
        let (value, outcome) = body(scope).await;
        self.finish(&handle, outcome).await?;
        Ok(value)
    }
}
