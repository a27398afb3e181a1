//! Retry with an explicit policy
//!
//! [`RetrySender`] re-sends a request up to `max_retries` more times. Which
//! outcomes are worth another attempt is decided by a [`RetryPolicy`]
//! instead of being hard-wired.

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::{Error, Request, Response, Result, Sender};

// =============================================================================
// Retry Policy
// =============================================================================

/// Outcome of classifying one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again if attempts remain
    Retry,
    /// Hand the outcome to the caller now
    Stop,
}

/// Classify attempt outcomes as retriable or final
pub trait RetryPolicy: Send + Sync + fmt::Debug {
    /// Classify a failed attempt
    fn on_error(&self, error: &Error) -> RetryDecision;

    /// Classify a completed exchange
    ///
    /// Responses are final unless a policy says otherwise.
    fn on_response(&self, _response: &Response) -> RetryDecision {
        RetryDecision::Stop
    }
}

/// Retry transport failures, optionally retry selected status codes
///
/// - `Http`, `Io` and `Timeout` failures are retried
/// - `InvalidRequest` fails fast
/// - responses are returned as-is unless their status was added with
///   [`DefaultRetryPolicy::with_retry_status`]
///
/// # Examples
/// ```
/// use networking::{DefaultRetryPolicy, Response, RetryDecision, RetryPolicy};
///
/// let policy = DefaultRetryPolicy::new().with_retry_status(429);
/// assert_eq!(policy.on_response(&Response::new(429, vec![])), RetryDecision::Retry);
/// assert_eq!(policy.on_response(&Response::new(400, vec![])), RetryDecision::Stop);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultRetryPolicy {
    retry_statuses: BTreeSet<u16>,
}

impl DefaultRetryPolicy {
    /// Create a policy that never retries on a status code
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that also retries the usual transient statuses
    ///
    /// 408, 429, 500, 502, 503 and 504. Request errors such as 400, 413 and
    /// 422 are never in this table.
    pub fn transient_statuses() -> Self {
        [408, 429, 500, 502, 503, 504]
            .into_iter()
            .fold(Self::new(), |policy, status| policy.with_retry_status(status))
    }

    /// Retry responses carrying this status
    pub fn with_retry_status(mut self, status: u16) -> Self {
        self.retry_statuses.insert(status);
        self
    }

    /// Get the statuses that are retried
    pub fn retry_statuses(&self) -> &BTreeSet<u16> {
        &self.retry_statuses
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn on_error(&self, error: &Error) -> RetryDecision {
        if error.is_transport_failure() {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }

    fn on_response(&self, response: &Response) -> RetryDecision {
        if self.retry_statuses.contains(&response.status()) {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    pub max_retries: usize,
    /// Delay before the first retry; zero retries immediately
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier (e.g., 2.0 for exponential backoff)
    pub backoff_multiplier: f64,
    /// Time limit for a single attempt
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::ZERO,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            attempt_timeout: None,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Set the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Bound each attempt with a timeout
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    fn schedule(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_max_interval(self.max_delay)
            .with_multiplier(self.backoff_multiplier)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build()
    }
}

// =============================================================================
// Retry Sender
// =============================================================================

/// Sender that retries failed attempts according to a policy
///
/// Makes at most `max_retries + 1` attempts. The outcome of the last allowed
/// attempt is returned unchanged, failure or not.
#[derive(Debug, Clone)]
pub struct RetrySender<S> {
    config: RetryConfig,
    policy: Arc<dyn RetryPolicy>,
    inner: S,
}

impl<S: Sender> RetrySender<S> {
    /// Wrap a sender with the default policy
    pub fn new(config: RetryConfig, inner: S) -> Self {
        Self {
            config,
            policy: Arc::new(DefaultRetryPolicy::new()),
            inner,
        }
    }

    /// Replace the retry policy
    pub fn with_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Get the retry configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Get the wrapped sender
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn attempt(&self, request: Request) -> Result<Response> {
        match self.config.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.send(request))
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => self.inner.send(request).await,
        }
    }
}

#[async_trait]
impl<S: Sender> Sender for RetrySender<S> {
    async fn send(&self, request: Request) -> Result<Response> {
        let mut schedule = self.config.schedule();
        let mut attempt = 0;

        loop {
            let outcome = self.attempt(request.clone()).await;
            let last = attempt >= self.config.max_retries;

            match outcome {
                Ok(response) => {
                    if last || self.policy.on_response(&response) == RetryDecision::Stop {
                        return Ok(response);
                    }
                    tracing::warn!(
                        attempt,
                        status = response.status(),
                        "retrying after retriable status"
                    );
                }
                Err(err) => {
                    if last || self.policy.on_error(&err) == RetryDecision::Stop {
                        return Err(err);
                    }
                    tracing::warn!(attempt, error = %err, "retrying after failed attempt");
                }
            }

            if let Some(delay) = schedule.next_backoff() {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
            }
            attempt += 1;
        }
    }
}
