// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded exponential-backoff retry.
//!
//! A policy is `{ max_retries, base_delay, classifier }`. Work is re-run after
//! each transient failure, waiting `base_delay * 2^k` before retry `k`
//! (k = 1, 2, 3, ...). Fatal failures are returned straight away.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use strum::Display;
use thiserror::Error;
use tracing::debug;

use crate::observer::{RetryEvent, RetryObserver, TracingRetryObserver};

/// Whether retrying a failure can plausibly help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FailureClass {
    /// Connectivity loss, timeouts, lock contention.
    Transient,
    /// Constraint violations, misconfiguration, anything else.
    Fatal,
}

/// Errors that know their own [`FailureClass`].
///
/// Used as the default classifier by [`RetryPolicy::new`].
pub trait Classify {
    fn failure_class(&self) -> FailureClass;
}

/// Terminal outcome of a failed [`RetryPolicy::execute`] call.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed transiently. Holds the cause of the last one.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: E,
    },

    /// A failure classified as fatal ended the call on the spot.
    #[error("{0}")]
    Fatal(#[source] E),
}

impl<E> RetryError<E> {
    /// Total number of times the work ran before the policy gave up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Fatal(_) => 1,
        }
    }

    /// Unwraps the underlying failure.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Fatal(e) => e,
        }
    }
}

/// Delay before retry number `retry`: `base * 2^retry`, saturating.
pub fn backoff_delay(base: Duration, retry: u32) -> Duration {
    let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Per-call retry bookkeeping.
///
/// Created when [`RetryPolicy::execute`] starts and dropped when it returns.
#[derive(Debug, Clone)]
pub struct RetryContext {
    attempt: u32,
    max_retries: u32,
    base_delay: Duration,
    last_class: Option<FailureClass>,
}

impl RetryContext {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            attempt: 0,
            max_retries,
            base_delay,
            last_class: None,
        }
    }

    /// Number of the attempt in flight (1-based), or 0 before the first one.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn retries_used(&self) -> u32 {
        self.attempt.saturating_sub(1)
    }

    pub fn last_class(&self) -> Option<FailureClass> {
        self.last_class
    }

    fn begin_attempt(&mut self) {
        self.attempt += 1;
    }

    /// Records the outcome of the current attempt. Returns the wait before the
    /// next attempt, or `None` if the call must stop here.
    fn record_failure(&mut self, class: FailureClass) -> Option<Duration> {
        self.last_class = Some(class);
        match class {
            FailureClass::Fatal => None,
            FailureClass::Transient if self.attempt > self.max_retries => None,
            FailureClass::Transient => Some(backoff_delay(self.base_delay, self.attempt)),
        }
    }
}

type Classifier<E> = Arc<dyn Fn(&E) -> FailureClass + Send + Sync>;

/// Retries a unit of work over transient failures with exponential backoff.
///
/// `max_retries = M` allows M retries after the first attempt, so at most
/// M + 1 runs of the work.
pub struct RetryPolicy<E> {
    max_retries: u32,
    base_delay: Duration,
    classifier: Classifier<E>,
    observer: Arc<dyn RetryObserver<E>>,
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            base_delay: self.base_delay,
            classifier: Arc::clone(&self.classifier),
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .finish_non_exhaustive()
    }
}

impl<E> RetryPolicy<E>
where
    E: Classify + fmt::Display + 'static,
{
    /// Policy that classifies with [`Classify`] and logs retries via `tracing`.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            classifier: Arc::new(|e: &E| e.failure_class()),
            observer: Arc::new(TracingRetryObserver),
        }
    }
}

impl<E> RetryPolicy<E> {
    /// Replaces the transient/fatal classifier.
    pub fn with_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&E) -> FailureClass + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Replaces the retry observer.
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver<E>>) -> Self {
        self.observer = observer;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Runs `work` until it succeeds, fails fatally, or the budget is spent.
    ///
    /// The only suspension points are the work itself and the backoff sleep,
    /// so dropping the returned future cancels cleanly at either.
    pub async fn execute<T, F, Fut>(&self, mut work: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut ctx = RetryContext::new(self.max_retries, self.base_delay);
        loop {
            ctx.begin_attempt();
            let err = match work().await {
                Ok(value) => {
                    if ctx.retries_used() > 0 {
                        debug!(attempt = ctx.attempt(), "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let class = (self.classifier)(&err);
            let Some(delay) = ctx.record_failure(class) else {
                return Err(match class {
                    FailureClass::Fatal => RetryError::Fatal(err),
                    FailureClass::Transient => RetryError::Exhausted {
                        attempts: ctx.attempt(),
                        last: err,
                    },
                });
            };

            self.observer.on_retry(&RetryEvent {
                attempt: ctx.attempt(),
                delay,
                cause: &err,
            });
            drop(err);
            tokio::time::sleep(delay).await;
        }
    }
}
