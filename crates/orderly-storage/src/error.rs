// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw storage errors and their transient/fatal classification.

use std::time::Duration;

use orderly_resilience::{Classify, FailureClass};
use rusqlite::ErrorCode;
use strum::Display;
use thiserror::Error;

/// The step of a save attempt that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Open,
    Begin,
    Insert,
    Commit,
    Rollback,
    Close,
    /// Schema bootstrap.
    Schema,
    /// Read-side queries.
    Query,
}

/// Unclassified failure of a single save attempt.
///
/// The executor returns these as-is. [`StoreError::failure_class`] is the
/// default retry classifier.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection factory produced no usable handle.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The database file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// SQLite reported an error.
    #[error("sqlite error during {operation}: {source}")]
    Sqlite {
        operation: Operation,
        source: rusqlite::Error,
    },

    /// The background connection thread went away.
    #[error("connection lost during {operation}: {message}")]
    Driver { operation: Operation, message: String },

    /// A step did not finish within the operation timeout.
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: Operation, after: Duration },

    /// A statement was issued on a connection that was never opened.
    #[error("connection used before open")]
    NotOpen,

    /// The caller stopped waiting while the step was running.
    #[error("{operation} interrupted by cancellation")]
    Interrupted { operation: Operation },

    /// Commit was sent but its acknowledgement was lost.
    ///
    /// The row may or may not be durable, so the insert must not be re-run.
    #[error("commit outcome unknown: {source}")]
    CommitOutcomeUnknown { source: Box<StoreError> },
}

impl StoreError {
    /// Converts a tokio-rusqlite call error for the given step.
    pub fn from_driver(operation: Operation, err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(source) => StoreError::Sqlite { operation, source },
            other => StoreError::Driver {
                operation,
                message: other.to_string(),
            },
        }
    }

    /// Builds an error carrying a raw SQLite result code, as the driver would.
    pub fn sqlite_code(operation: Operation, code: std::ffi::c_int, message: &str) -> Self {
        StoreError::Sqlite {
            operation,
            source: rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(code),
                Some(message.to_string()),
            ),
        }
    }

    /// The SQLite error code, if this error came from SQLite.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            StoreError::Sqlite { source, .. } => source.sqlite_error_code(),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            StoreError::Sqlite { operation, .. }
            | StoreError::Driver { operation, .. }
            | StoreError::Timeout { operation, .. }
            | StoreError::Interrupted { operation } => Some(*operation),
            StoreError::Open { .. } => Some(Operation::Open),
            StoreError::CommitOutcomeUnknown { .. } => Some(Operation::Commit),
            StoreError::Configuration(_) | StoreError::NotOpen => None,
        }
    }

    /// Rewrites a commit failure whose outcome cannot be known.
    ///
    /// A timeout or lost connection during commit may hide a durable row;
    /// SQLite-reported errors such as `SQLITE_BUSY` guarantee the commit did not
    /// happen and pass through unchanged.
    pub(crate) fn settle_commit(self) -> Self {
        match self {
            StoreError::Timeout { .. } | StoreError::Driver { .. } => {
                StoreError::CommitOutcomeUnknown {
                    source: Box::new(self),
                }
            }
            other => other,
        }
    }
}

impl Classify for StoreError {
    /// Connectivity, timeout, and lock contention are transient; the rest is fatal.
    fn failure_class(&self) -> FailureClass {
        match self {
            StoreError::Open { .. } | StoreError::Driver { .. } | StoreError::Timeout { .. } => {
                FailureClass::Transient
            }
            StoreError::Sqlite { source, .. } => match source.sqlite_error_code() {
                Some(
                    ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::FileLockingProtocolFailed,
                ) => FailureClass::Transient,
                _ => FailureClass::Fatal,
            },
            StoreError::Configuration(_)
            | StoreError::NotOpen
            | StoreError::Interrupted { .. }
            | StoreError::CommitOutcomeUnknown { .. } => FailureClass::Fatal,
        }
    }
}
