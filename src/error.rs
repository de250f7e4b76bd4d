//! Top-level bootstrap errors and their exit codes.

use std::process::ExitStatus;

use nix::sys::signal::Signal;
use thiserror::Error;

use crate::config::ConfigError;
use crate::daemon::{exit_code, DaemonError};
use crate::keyfile::KeyfileError;
use crate::shell::{CommandFailed, ShellError};

/// Exit code for every fatal bootstrap failure that is not the daemon's own.
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Errors that abort the bootstrap sequence.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Keyfile(#[from] KeyfileError),

    #[error(transparent)]
    Daemon(#[from] DaemonError),

    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error(transparent)]
    Command(#[from] CommandFailed),

    #[error("{what} not ready after {attempts} attempts: {last}")]
    NotReady {
        what: &'static str,
        attempts: u32,
        last: String,
    },

    #[error("replica set {set} has members {actual:?}, expected {expected:?}")]
    TopologyMismatch {
        set: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("unexpected {command} reply: {detail}")]
    UnexpectedReply {
        command: &'static str,
        detail: String,
    },

    #[error("daemon exited during bootstrap with {0}")]
    DaemonExited(ExitStatus),

    #[error("interrupted by {0} during bootstrap")]
    Interrupted(Signal),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),
}

impl BootstrapError {
    /// Process exit code for this failure.
    ///
    /// A daemon that died during bootstrap hands us its own status; a signal
    /// follows the shell's `128 + n` convention.
    pub fn exit_code(&self) -> u8 {
        match self {
            BootstrapError::DaemonExited(status) => exit_code(*status),
            BootstrapError::Interrupted(signal) => 128u8.wrapping_add(*signal as i32 as u8),
            _ => FAILURE_EXIT_CODE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn test_daemon_exit_code_is_forwarded() {
        let err = BootstrapError::DaemonExited(ExitStatus::from_raw(42 << 8));
        assert_eq!(err.exit_code(), 42);
    }

    #[test]
    fn test_interrupted_uses_signal_convention() {
        assert_eq!(BootstrapError::Interrupted(Signal::SIGTERM).exit_code(), 143);
        assert_eq!(BootstrapError::Interrupted(Signal::SIGINT).exit_code(), 130);
    }

    #[test]
    fn test_other_failures_exit_one() {
        let err = BootstrapError::from(KeyfileError::SourceMissing("/nope".into()));
        assert_eq!(err.exit_code(), FAILURE_EXIT_CODE);
        assert_eq!(err.to_string(), "keyfile source /nope does not exist");
    }
}
