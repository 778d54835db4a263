// TestDependencies - mock implementations for testing
//
// In-memory storage that records transaction lifecycle calls so the
// GraphQL pipeline can be exercised without Postgres.

use async_trait::async_trait;
use sqlx::PgConnection;
use std::sync::{Arc, Mutex, PoisonError};

use super::transaction::{IsolationLevel, StorageTransaction, TransactionOpener};

// =============================================================================
// Mock Storage
// =============================================================================

/// Lifecycle calls observed by a [`MockStorage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionLog {
    pub opened: usize,
    pub committed: usize,
    pub rolled_back: usize,
    /// Transactions dropped while still open (storage rolls these back).
    pub dropped_open: usize,
    pub isolation: Vec<IsolationLevel>,
}

impl TransactionLog {
    /// Transactions closed by commit or rollback.
    pub fn closed(&self) -> usize {
        self.committed + self.rolled_back
    }
}

#[derive(Default)]
struct MockStorageState {
    log: TransactionLog,
    unavailable: bool,
    fail_commit: bool,
    stall_commit: bool,
}

/// Storage double implementing [`TransactionOpener`].
#[derive(Clone, Default)]
pub struct MockStorage {
    state: Arc<Mutex<MockStorageState>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose `begin` always fails.
    pub fn unavailable() -> Self {
        let storage = Self::new();
        storage.state.lock().unwrap().unavailable = true;
        storage
    }

    /// Storage whose commits fail (rollbacks still succeed).
    pub fn failing_commit() -> Self {
        let storage = Self::new();
        storage.state.lock().unwrap().fail_commit = true;
        storage
    }

    /// Storage whose commits never complete.
    pub fn stalled_commit() -> Self {
        let storage = Self::new();
        storage.state.lock().unwrap().stall_commit = true;
        storage
    }

    /// Snapshot of the calls seen so far.
    pub fn log(&self) -> TransactionLog {
        self.state.lock().unwrap().log.clone()
    }
}

#[async_trait]
impl TransactionOpener for MockStorage {
    async fn begin(
        &self,
        isolation: IsolationLevel,
    ) -> Result<Box<dyn StorageTransaction>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(sqlx::Error::PoolTimedOut);
        }
        state.log.opened += 1;
        state.log.isolation.push(isolation);

        Ok(Box::new(MockTransaction {
            state: self.state.clone(),
            closed: false,
        }))
    }
}

struct MockTransaction {
    state: Arc<Mutex<MockStorageState>>,
    closed: bool,
}

#[async_trait]
impl StorageTransaction for MockTransaction {
    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        let mut this = self;
        let stall = this.state.lock().unwrap().stall_commit;
        if stall {
            std::future::pending::<()>().await;
        }

        this.closed = true;
        let mut state = this.state.lock().unwrap();
        if state.fail_commit {
            state.log.rolled_back += 1;
            return Err(sqlx::Error::WorkerCrashed);
        }
        state.log.committed += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), sqlx::Error> {
        let mut this = self;
        this.closed = true;
        this.state.lock().unwrap().log.rolled_back += 1;
        Ok(())
    }

    fn connection(&mut self) -> Option<&mut PgConnection> {
        None
    }
}

// Mirrors sqlx, where dropping an open transaction rolls it back.
impl Drop for MockTransaction {
    fn drop(&mut self) {
        if !self.closed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.log.dropped_open += 1;
        }
    }
}
