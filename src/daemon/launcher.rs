//! Daemon process spawning and supervision.

use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};

use crate::config::DaemonConfig;
use crate::daemon::DaemonError;

/// Build the daemon's argument list.
///
/// The fixed flags come first so `extra_args` cannot reorder them.
pub fn daemon_args(config: &DaemonConfig, set_name: &str, keyfile: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--replSet".into(),
        set_name.into(),
        "--keyFile".into(),
        keyfile.as_os_str().to_owned(),
        "--bind_ip_all".into(),
    ];
    args.extend(config.extra_args.iter().map(OsString::from));
    args
}

/// A running daemon owned by this process.
#[derive(Debug)]
pub struct DaemonProcess {
    child: Child,
    pid: u32,
    exited: Option<ExitStatus>,
}

impl DaemonProcess {
    /// Start the daemon in the background with inherited stdout/stderr.
    pub fn spawn(config: &DaemonConfig, set_name: &str, keyfile: &Path) -> Result<Self, DaemonError> {
        let args = daemon_args(config, set_name, keyfile);

        let child = Command::new(&config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DaemonError::Spawn {
                binary: config.binary.clone(),
                source,
            })?;

        let pid = child.id().ok_or(DaemonError::NoPid)?;

        tracing::info!(
            binary = %config.binary,
            pid,
            args = ?args,
            "Daemon launched"
        );

        Ok(Self {
            child,
            pid,
            exited: None,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Non-blocking check for an exit that already happened.
    pub fn try_exit_status(&mut self) -> Result<Option<ExitStatus>, DaemonError> {
        if let Some(status) = self.exited {
            return Ok(Some(status));
        }
        let status = self.child.try_wait().map_err(DaemonError::Wait)?;
        self.exited = status;
        Ok(status)
    }

    /// Block until the daemon exits.
    pub async fn wait(&mut self) -> Result<ExitStatus, DaemonError> {
        if let Some(status) = self.exited {
            return Ok(status);
        }
        let status = self.child.wait().await.map_err(DaemonError::Wait)?;
        self.exited = Some(status);
        Ok(status)
    }

    /// Deliver `signal` to the daemon. A daemon that already exited is not an
    /// error.
    pub fn signal(&self, signal: Signal) -> Result<(), DaemonError> {
        if self.exited.is_some() {
            return Ok(());
        }
        match kill(Pid::from_raw(self.pid as i32), signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(source) => Err(DaemonError::Signal {
                pid: self.pid,
                signal,
                source,
            }),
        }
    }

    /// Ask the daemon to stop with SIGTERM and wait for it.
    pub async fn terminate(&mut self) -> Result<ExitStatus, DaemonError> {
        tracing::info!(pid = self.pid, "Stopping daemon");
        self.signal(Signal::SIGTERM)?;
        self.wait().await
    }
}
