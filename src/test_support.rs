//! Shared fixtures for unit tests.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use serde_json::json;

use crate::config::DaemonConfig;
use crate::daemon::DaemonProcess;
use crate::resilience::RetryPolicy;
use crate::shell::{AdminCommand, CommandReply, ShellError};

/// Connection refused, as the client tool reports it before the daemon
/// listens.
pub fn refused() -> ShellError {
    ShellError::Failed {
        command: "ping",
        code: Some(1),
        stderr: "MongoNetworkError: connect ECONNREFUSED 127.0.0.1:27017".into(),
    }
}

/// What a freshly started single-node daemon answers to each command.
pub fn healthy_reply(command: &AdminCommand) -> Result<CommandReply, ShellError> {
    Ok(match command {
        AdminCommand::Hello => CommandReply::success().with_field("isWritablePrimary", json!(true)),
        AdminCommand::ReplSetGetConfig => CommandReply::success().with_field(
            "config",
            json!({ "_id": "rs0", "members": [{ "_id": 0, "host": "localhost:27017" }] }),
        ),
        _ => CommandReply::success(),
    })
}

/// Write an executable `/bin/sh` script into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

/// Daemon config pointing at a script running `body`.
pub fn fake_daemon_config(dir: &Path, body: &str) -> DaemonConfig {
    DaemonConfig {
        binary: write_script(dir, "fake-mongod", body),
        extra_args: Vec::new(),
    }
}

/// Spawn a script standing in for the daemon.
pub fn fake_daemon(dir: &Path, body: &str) -> DaemonProcess {
    let config = fake_daemon_config(dir, body);
    DaemonProcess::spawn(&config, "rs0", &dir.join("keyfile")).unwrap()
}

pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    }
}
