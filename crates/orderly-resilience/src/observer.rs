// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry notifications.

use std::fmt;
use std::time::Duration;

use tracing::warn;

/// Emitted once per retry, before the backoff wait starts.
#[derive(Debug)]
pub struct RetryEvent<'a, E> {
    /// Retry number, starting at 1 for the first retry.
    pub attempt: u32,
    /// How long the policy will wait before re-running the work.
    pub delay: Duration,
    /// The transient failure that triggered this retry.
    pub cause: &'a E,
}

/// Receives retry notifications for telemetry.
pub trait RetryObserver<E>: Send + Sync {
    fn on_retry(&self, event: &RetryEvent<'_, E>);
}

/// Logs each retry at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRetryObserver;

impl<E: fmt::Display> RetryObserver<E> for TracingRetryObserver {
    fn on_retry(&self, event: &RetryEvent<'_, E>) {
        warn!(
            attempt = event.attempt,
            delay_ms = event.delay.as_millis() as u64,
            cause = %event.cause,
            "transient failure, retrying"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn tracing_observer_logs_retry() {
        let cause = "database is locked".to_string();
        let event = RetryEvent {
            attempt: 2,
            delay: Duration::from_millis(400),
            cause: &cause,
        };
        TracingRetryObserver.on_retry(&event);
        assert!(logs_contain("transient failure, retrying"));
        assert!(logs_contain("database is locked"));
    }
}
