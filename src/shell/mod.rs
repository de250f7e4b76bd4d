//! Scripting-client subsystem.
//!
//! # Data Flow
//! ```text
//! AdminCommand (command.rs)
//!     → JSON document + eval script
//!     → client.rs (spawn mongosh --eval, bounded by a timeout)
//!     → reply.rs (parse last EJSON line into CommandReply)
//!     → caller classifies by structured error code
//! ```
//!
//! # Design Decisions
//! - Replies are classified by numeric code, never by message text
//! - A rejected command (`ok: 0`) is a reply, not an error; only failing to
//!   get a reply is a [`ShellError`]
//! - `Unauthorized` is retried once with the admin credentials so re-runs work
//!   after the first user exists

pub mod client;
pub mod command;
pub mod reply;

use thiserror::Error;

#[cfg(test)]
pub use client::MockAdminClient;
pub use client::{AdminClient, Credentials, MongoShell};
pub use command::{AdminCommand, ReplicaSetSpec, Secret};
pub use reply::{CommandFailed, CommandReply, Outcome};

/// Failure to obtain a reply from the client tool.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to run client {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command}: client did not finish within {secs}s")]
    Timeout { command: &'static str, secs: u64 },

    #[error("{command}: client exited with {} and no reply: {stderr}",
        .code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    Failed {
        command: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{command}: unparseable reply {output:?}: {source}")]
    MalformedReply {
        command: &'static str,
        output: String,
        #[source]
        source: serde_json::Error,
    },
}
