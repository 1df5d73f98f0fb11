// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection factories with scripted failures.
//!
//! [`FaultInjectingFactory`] hands out real SQLite connections and fails
//! chosen steps a fixed number of times, so retry, rollback, and release
//! behaviour can be checked against an actual database.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::ffi;

use orderly_core::{Order, OrderId};
use orderly_storage::{
    ConnectionFactory, DataSource, Operation, SqliteConnectionFactory, StoreConnection,
    StoreError,
};

/// Where in a save attempt a fault fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultStep {
    Open,
    Begin,
    /// Before the row is written.
    Insert,
    /// After the row is written, before commit is issued.
    AfterInsert,
    Commit,
    /// After the store has committed, before the acknowledgement is returned.
    AfterCommit,
    Close,
}

impl FaultStep {
    fn operation(self) -> Operation {
        match self {
            FaultStep::Open => Operation::Open,
            FaultStep::Begin => Operation::Begin,
            FaultStep::Insert | FaultStep::AfterInsert => Operation::Insert,
            FaultStep::Commit | FaultStep::AfterCommit => Operation::Commit,
            FaultStep::Close => Operation::Close,
        }
    }
}

/// What the fault looks like to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// `SQLITE_BUSY`, transient.
    Busy,
    /// `SQLITE_CONSTRAINT`, fatal.
    Constraint,
    /// The driver thread went away, transient outside commit.
    Disconnect,
    /// Never completes; only a timeout or cancellation ends it.
    Stall,
}

/// A fault that fires on its step for the next `times` attempts reaching it.
#[derive(Debug, Clone, Copy)]
pub struct Fault {
    pub step: FaultStep,
    pub kind: FaultKind,
    pub times: u32,
}

impl Fault {
    pub fn new(step: FaultStep, kind: FaultKind, times: u32) -> Self {
        Self { step, kind, times }
    }

    /// Fires on every attempt.
    pub fn always(step: FaultStep, kind: FaultKind) -> Self {
        Self::new(step, kind, u32::MAX)
    }
}

#[derive(Default)]
struct FaultState {
    faults: Mutex<Vec<Fault>>,
    created: AtomicU32,
    live: AtomicUsize,
}

impl FaultState {
    fn trigger(&self, step: FaultStep) -> Option<FaultKind> {
        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        let fault = faults.iter_mut().find(|f| f.step == step && f.times > 0)?;
        fault.times -= 1;
        Some(fault.kind)
    }
}

/// Wraps [`SqliteConnectionFactory`] with scripted faults and connection counters.
#[derive(Clone)]
pub struct FaultInjectingFactory {
    inner: SqliteConnectionFactory,
    state: Arc<FaultState>,
}

impl FaultInjectingFactory {
    pub fn new(source: DataSource) -> Self {
        Self {
            inner: SqliteConnectionFactory::new(source, Duration::from_millis(200)),
            state: Arc::default(),
        }
    }

    /// Adds a fault. Faults on the same step fire in the order added.
    pub fn with_fault(self, fault: Fault) -> Self {
        self.state
            .faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(fault);
        self
    }

    /// Connections handed out so far, one per attempt.
    pub fn connections_created(&self) -> u32 {
        self.state.created.load(Ordering::SeqCst)
    }

    /// Connections handed out and not yet dropped.
    pub fn live_connections(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }
}

impl ConnectionFactory for FaultInjectingFactory {
    fn create_connection(&self) -> Option<Box<dyn StoreConnection>> {
        let inner = self.inner.create_connection()?;
        self.state.created.fetch_add(1, Ordering::SeqCst);
        self.state.live.fetch_add(1, Ordering::SeqCst);
        Some(Box::new(FaultyConnection {
            inner,
            state: Arc::clone(&self.state),
        }))
    }
}

struct FaultyConnection {
    inner: Box<dyn StoreConnection>,
    state: Arc<FaultState>,
}

async fn inject(state: &FaultState, step: FaultStep) -> Result<(), StoreError> {
    let Some(kind) = state.trigger(step) else {
        return Ok(());
    };
    let operation = step.operation();
    tracing::debug!(?step, ?kind, "injecting fault");
    Err(match kind {
        FaultKind::Busy => {
            StoreError::sqlite_code(operation, ffi::SQLITE_BUSY, "database is locked")
        }
        FaultKind::Constraint => StoreError::sqlite_code(
            operation,
            ffi::SQLITE_CONSTRAINT,
            "constraint failed",
        ),
        FaultKind::Disconnect => StoreError::Driver {
            operation,
            message: "connection closed".to_string(),
        },
        FaultKind::Stall => std::future::pending::<StoreError>().await,
    })
}

impl Drop for FaultyConnection {
    fn drop(&mut self) {
        self.state.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreConnection for FaultyConnection {
    async fn open(&mut self) -> Result<(), StoreError> {
        inject(&self.state, FaultStep::Open).await?;
        self.inner.open().await
    }

    async fn begin(&mut self) -> Result<(), StoreError> {
        inject(&self.state, FaultStep::Begin).await?;
        self.inner.begin().await
    }

    async fn insert_order(&mut self, order: &Order) -> Result<OrderId, StoreError> {
        inject(&self.state, FaultStep::Insert).await?;
        let id = self.inner.insert_order(order).await?;
        inject(&self.state, FaultStep::AfterInsert).await?;
        Ok(id)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        inject(&self.state, FaultStep::Commit).await?;
        self.inner.commit().await?;
        inject(&self.state, FaultStep::AfterCommit).await
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.inner.rollback().await
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        inject(&self.state, FaultStep::Close).await?;
        self.inner.close().await
    }
}

/// A factory that cannot produce a connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullConnectionFactory;

impl ConnectionFactory for NullConnectionFactory {
    fn create_connection(&self) -> Option<Box<dyn StoreConnection>> {
        None
    }
}
