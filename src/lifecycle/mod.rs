//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Install keyfile → Launch daemon → readiness.rs (ping)
//!     → replica_set.rs (initiate, verify) → readiness.rs (primary)
//!     → admin_user.rs (create user) → signals.rs (supervise)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT during bootstrap → stop daemon, exit 128+n
//!     SIGTERM/SIGINT while attached → forward to daemon, keep waiting
//! ```
//!
//! # Design Decisions
//! - Ordered startup; each step finishes before the next begins
//! - Mutating steps tolerate exactly their own "already done" code, so the
//!   whole sequence can be re-run against an existing data directory

pub mod admin_user;
pub mod readiness;
pub mod replica_set;
pub mod signals;
pub mod startup;

pub use startup::{run, run_with_client};

/// Coarse progress of the bootstrap, logged on each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    NotStarted,
    Initializing,
    Ready,
}

impl BootstrapPhase {
    /// Move to `next`, logging the transition.
    pub fn advance(self, next: BootstrapPhase) -> BootstrapPhase {
        tracing::info!(from = ?self, to = ?next, "Bootstrap phase changed");
        next
    }
}
