//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Readiness probe (ping / hello):
//!     → retries.rs (poll until ready, fail, or attempts exhausted)
//!     → backoff.rs (delay between attempts)
//! ```
//!
//! # Design Decisions
//! - Every wait is bounded; nothing sleeps a fixed, unconditional duration
//! - Probes decide what counts as retryable

pub mod backoff;
pub mod retries;

pub use retries::{poll_until, Attempt, RetryError, RetryPolicy};
