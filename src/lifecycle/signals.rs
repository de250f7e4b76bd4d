//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGTERM/SIGINT handlers before the daemon is launched
//! - While attached to the daemon, forward them and keep waiting
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The daemon decides how to shut down; we only relay and wait

use std::process::ExitStatus;

use nix::sys::signal::Signal;
use tokio::signal::unix::{signal, SignalKind};

use crate::daemon::{DaemonError, DaemonProcess};

/// Termination signals this process reacts to.
pub struct ShutdownSignals {
    term: tokio::signal::unix::Signal,
    int: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    /// Install handlers. From here on SIGTERM/SIGINT no longer kill us.
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for the next termination signal.
    pub async fn recv(&mut self) -> Signal {
        tokio::select! {
            _ = self.term.recv() => Signal::SIGTERM,
            _ = self.int.recv() => Signal::SIGINT,
        }
    }
}

/// Block until the daemon exits, relaying termination signals to it.
pub async fn supervise(
    daemon: &mut DaemonProcess,
    signals: &mut ShutdownSignals,
) -> Result<ExitStatus, DaemonError> {
    loop {
        tokio::select! {
            status = daemon.wait() => {
                let status = status?;
                tracing::info!(pid = daemon.pid(), %status, "Daemon exited");
                return Ok(status);
            }
            received = signals.recv() => {
                tracing::info!(signal = %received, pid = daemon.pid(), "Forwarding signal to daemon");
                daemon.signal(received)?;
            }
        }
    }
}
