//! Database daemon subsystem.
//!
//! # Responsibilities
//! - Launch the daemon with the replica-set and keyfile flags
//! - Track whether it has exited and with which status
//! - Deliver signals and translate its exit status into our own exit code

pub mod launcher;

use std::process::ExitStatus;

use nix::sys::signal::Signal;
use thiserror::Error;

pub use launcher::{daemon_args, DaemonProcess};

/// Errors raised while controlling the daemon process.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to launch daemon {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("daemon started without a process id")]
    NoPid,

    #[error("failed to wait for daemon: {0}")]
    Wait(#[source] std::io::Error),

    #[error("failed to send {signal} to daemon (pid {pid}): {source}")]
    Signal {
        pid: u32,
        signal: Signal,
        #[source]
        source: nix::errno::Errno,
    },
}

/// Map a child's exit status to the code a shell would report for it.
///
/// Signalled exits become `128 + signal`, as `wait` in a shell script does.
pub fn exit_code(status: ExitStatus) -> u8 {
    use std::os::unix::process::ExitStatusExt;

    if let Some(code) = status.code() {
        return (code & 0xff) as u8;
    }
    match status.signal() {
        Some(signal) => 128u8.wrapping_add(signal as u8),
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn test_exit_code_passthrough() {
        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        assert_eq!(exit_code(ExitStatus::from_raw(100 << 8)), 100);
    }

    #[test]
    fn test_signalled_exit_uses_shell_convention() {
        // Raw wait status for "killed by SIGTERM" is the signal number itself.
        assert_eq!(exit_code(ExitStatus::from_raw(15)), 143);
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }
}
