//! Shared utilities for end-to-end bootstrap tests.
//!
//! A `Harness` owns a temp directory holding a keyfile, a config file, and two
//! shell scripts standing in for `mongod` and `mongosh`. The fake client keeps
//! replica-set and user state as marker files, so it behaves the same way
//! across repeated runs against one directory.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

const FAKE_DAEMON: &str = r#"#!/bin/sh
S='@STATE@'
echo "$@" > "$S/daemon.args"
echo $$ > "$S/daemon.pid"
trap 'touch "$S/terminated"; rm -f "$S/daemon.pid"; exit 0' TERM INT
while [ ! -f "$S/stop" ]; do sleep 0.05; done
code=$(cat "$S/stop")
rm -f "$S/stop" "$S/daemon.pid"
exit "$code"
"#;

const STALLED_CLIENT: &str = r#"#!/bin/sh
echo "MongoNetworkError: connect ECONNREFUSED 127.0.0.1:27017" >&2
exit 1
"#;

const FAKE_CLIENT: &str = r#"#!/bin/sh
S='@STATE@'
script=""
authed=no
while [ $# -gt 0 ]; do
  case "$1" in
    --eval) script="$2"; shift 2 ;;
    --username) authed=yes; shift 2 ;;
    *) shift ;;
  esac
done
if [ ! -f "$S/daemon.pid" ]; then
  echo "MongoNetworkError: connect ECONNREFUSED 127.0.0.1:27017" >&2
  exit 1
fi
needs_auth() {
  if [ -f "$S/user" ] && [ "$authed" = no ]; then
    echo '{"ok":0,"code":13,"codeName":"Unauthorized","errmsg":"Command requires authentication"}'
    exit 0
  fi
}
case "$script" in
  *'"ping"'*)
    echo '{"ok":1}' ;;
  *'"hello"'*)
    echo '{"ok":1,"isWritablePrimary":true}' ;;
  *'"replSetInitiate"'*)
    needs_auth
    if [ -f "$S/initiated" ]; then
      echo '{"ok":0,"code":23,"codeName":"AlreadyInitialized","errmsg":"already initialized"}'
    else
      touch "$S/initiated"
      echo '{"ok":1}'
    fi ;;
  *'"replSetGetConfig"'*)
    needs_auth
    echo '{"ok":1,"config":{"_id":"rs0","version":1,"members":[{"_id":0,"host":"localhost:27017"}]}}' ;;
  *'"createUser"'*)
    needs_auth
    printf '%s\n' "$script" | grep runCommand >> "$S/create-user.log"
    if [ -f "$S/user" ]; then
      echo '{"ok":0,"code":51003,"codeName":"Location51003","errmsg":"User \"admin@admin\" already exists"}'
    else
      touch "$S/user"
      echo '{"ok":1}'
    fi ;;
  *)
    echo "unknown command" >&2
    exit 2 ;;
esac
"#;

pub const PASSWORD: &str = "hunter2";

const BASE_ENV: [(&str, &str); 2] = [("RUST_LOG", "replset_bootstrap=debug"), ("NO_COLOR", "1")];

const CLEARED_ENV: [&str; 5] = [
    "REPLSET_ADMIN_PASSWORD",
    "REPLSET_KEYFILE_SOURCE",
    "REPLSET_KEYFILE_DESTINATION",
    "REPLSET_DAEMON_BIN",
    "REPLSET_SHELL_BIN",
];

pub struct Harness {
    dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let harness = Self { dir };
        std::fs::create_dir_all(harness.state()).unwrap();
        std::fs::write(harness.keyfile_source(), b"shared-secret\n").unwrap();
        harness.write_script("fake-mongod", FAKE_DAEMON);
        harness.write_script("fake-mongosh", FAKE_CLIENT);
        harness.write_config(&format!("[admin]\npassword = \"{PASSWORD}\"\n"));
        harness
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn state(&self) -> PathBuf {
        self.root().join("state")
    }

    pub fn keyfile_source(&self) -> PathBuf {
        self.root().join("secret")
    }

    pub fn keyfile_destination(&self) -> PathBuf {
        self.root().join("data/db/keyfile")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("bootstrap.toml")
    }

    fn write_script(&self, name: &str, template: &str) {
        let path = self.root().join(name);
        let body = template.replace("@STATE@", &self.state().to_string_lossy());
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Write the config file; `extra` is appended as-is.
    pub fn write_config(&self, extra: &str) {
        let content = format!(
            r#"[keyfile]
source = "{source}"
destination = "{destination}"

[daemon]
binary = "{daemon}"

[shell]
binary = "{client}"
timeout_secs = 5

[readiness]
max_attempts = 100
base_delay_ms = 10
max_delay_ms = 50

{extra}"#,
            source = self.keyfile_source().display(),
            destination = self.keyfile_destination().display(),
            daemon = self.root().join("fake-mongod").display(),
            client = self.root().join("fake-mongosh").display(),
        );
        std::fs::write(self.config_path(), content).unwrap();
    }

    /// Replace the client tool with one that never reaches the daemon.
    pub fn stall_client(&self) {
        self.write_script("fake-mongosh", STALLED_CLIENT);
    }

    /// The binary as a one-shot command, run to completion by `assert()`.
    pub fn cli(&self) -> assert_cmd::Command {
        let mut command = cargo_bin_cmd!("replset-bootstrap");
        command.arg("--config").arg(self.config_path());
        for (key, value) in BASE_ENV {
            command.env(key, value);
        }
        for key in CLEARED_ENV {
            command.env_remove(key);
        }
        command.timeout(Duration::from_secs(20));
        command
    }

    /// The binary as a long-running child, for tests that act on it while it
    /// supervises the daemon.
    pub fn spawn(&self) -> Child {
        self.spawn_with_env(&[])
    }

    /// Like [`Harness::spawn`] with extra environment variables set last.
    pub fn spawn_with_env(&self, env: &[(&str, &str)]) -> Child {
        let mut command = Command::new(env!("CARGO_BIN_EXE_replset-bootstrap"));
        command.arg("--config").arg(self.config_path()).stdin(Stdio::null());
        for (key, value) in BASE_ENV {
            command.env(key, value);
        }
        for key in CLEARED_ENV {
            command.env_remove(key);
        }
        command.envs(env.iter().copied());
        command.spawn().unwrap()
    }

    /// Tell the fake daemon to exit with `code`.
    pub fn stop_daemon(&self, code: i32) {
        std::fs::write(self.state().join("stop"), code.to_string()).unwrap();
    }

    pub fn marker(&self, name: &str) -> PathBuf {
        self.state().join(name)
    }

    pub fn create_user_calls(&self) -> usize {
        std::fs::read_to_string(self.marker("create-user.log"))
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }
}

/// Poll until `condition` holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    condition()
}

/// Wait for `child` to exit, killing it if it takes longer than `timeout`.
pub fn wait_exit(child: &mut Child, timeout: Duration) -> ExitStatus {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("bootstrap did not exit within {timeout:?}");
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}
