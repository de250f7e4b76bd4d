//! Bounded polling.
//!
//! # Responsibilities
//! - Repeat a probe until it reports ready, fails hard, or attempts run out
//! - Sleep with exponential backoff + jitter between attempts
//!
//! # Design Decisions
//! - A probe classifies its own outcome; the loop never inspects errors
//! - Hard failures stop polling immediately (e.g. the daemon exited)
//! - No overall deadline; the attempt count and delay cap bound the wait

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::config::ReadinessConfig;
use crate::resilience::backoff::calculate_backoff;

/// How many times to probe and how long to sleep in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy for the initial `ping` poll.
    pub fn readiness(config: &ReadinessConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Policy for waiting on primary election after initiation.
    pub fn primary(config: &ReadinessConfig) -> Self {
        Self {
            max_attempts: config.primary_max_attempts,
            ..Self::readiness(config)
        }
    }
}

/// Outcome of a single probe.
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// Condition met; stop polling.
    Ready(T),
    /// Not yet; the string is logged and kept as the last reason.
    Pending(String),
    /// Unrecoverable; stop polling and surface the error.
    Fail(E),
}

/// Polling stopped without reaching the ready state.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("{what} not ready after {attempts} attempts: {last}")]
    Exhausted {
        what: &'static str,
        attempts: u32,
        last: String,
    },

    #[error(transparent)]
    Aborted(E),
}

/// Run `probe` until it returns [`Attempt::Ready`] or [`Attempt::Fail`], or
/// until `policy.max_attempts` probes have been made.
pub async fn poll_until<T, E, F, Fut>(
    policy: RetryPolicy,
    what: &'static str,
    mut probe: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
{
    let mut last = String::from("no attempt made");

    for attempt in 1..=policy.max_attempts {
        match probe(attempt).await {
            Attempt::Ready(value) => {
                tracing::debug!(what, attempt, "Ready");
                return Ok(value);
            }
            Attempt::Fail(e) => return Err(RetryError::Aborted(e)),
            Attempt::Pending(reason) => {
                last = reason;
            }
        }

        if attempt < policy.max_attempts {
            let delay = calculate_backoff(attempt, policy.base_delay, policy.max_delay);
            tracing::debug!(
                what,
                attempt,
                max_attempts = policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                reason = %last,
                "Not ready, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    Err(RetryError::Exhausted {
        what,
        attempts: policy.max_attempts,
        last,
    })
}
