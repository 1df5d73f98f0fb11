// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for Orderly.
//!
//! [`RetryPolicy`] wraps a unit of work in bounded exponential-backoff retry.
//! Failures are split into transient and fatal by an injected classifier, and
//! every retry is reported to a [`RetryObserver`].

pub mod observer;
pub mod retry;

pub use observer::{RetryEvent, RetryObserver, TracingRetryObserver};
pub use retry::{Classify, FailureClass, RetryContext, RetryError, RetryPolicy, backoff_delay};
