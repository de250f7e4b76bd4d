//! Single-node replica-set bootstrap.
//!
//! Installs the shared keyfile, launches the database daemon, waits for it,
//! initiates a one-member replica set, provisions the admin user, and then
//! stays attached to the daemon, exiting with its status.
//!
//! ```text
//!   keyfile ──▶ daemon ──▶ readiness ──▶ replica_set ──▶ admin_user ──▶ supervise
//!                  │            │              │              │            │
//!                  │            └──────── shell (mongosh --eval) ──────────┘
//!                  └──────────────────── exit status ─────────────────────▶ exit code
//! ```

// Core subsystems
pub mod config;
pub mod daemon;
pub mod keyfile;
pub mod shell;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

#[cfg(test)]
mod test_support;

pub use config::BootstrapConfig;
pub use error::BootstrapError;
pub use lifecycle::{run, run_with_client};
