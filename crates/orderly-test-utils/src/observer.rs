// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry observer that records every notification.

use std::fmt::Display;
use std::sync::Mutex;
use std::time::Duration;

use orderly_resilience::{RetryEvent, RetryObserver};

/// One captured retry notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRetry {
    pub attempt: u32,
    pub delay: Duration,
    pub cause: String,
}

/// Captures retry notifications for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RecordedRetry>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedRetry> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<E: Display> RetryObserver<E> for RecordingObserver {
    fn on_retry(&self, event: &RetryEvent<'_, E>) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRetry {
                attempt: event.attempt,
                delay: event.delay,
                cause: event.cause.to_string(),
            });
    }
}
