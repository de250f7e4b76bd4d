//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bootstrap.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the replica-set bootstrap.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Shared-secret keyfile installation.
    pub keyfile: KeyfileConfig,

    /// Database daemon launch settings.
    pub daemon: DaemonConfig,

    /// Scripting client used to issue admin commands.
    pub shell: ShellConfig,

    /// Replica-set topology.
    pub replica_set: ReplicaSetConfig,

    /// Administrative user provisioned after initiation.
    pub admin: AdminUserConfig,

    /// Readiness polling.
    pub readiness: ReadinessConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Keyfile source and destination.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct KeyfileConfig {
    /// Where the secret is mounted (read-only is fine).
    pub source: PathBuf,

    /// Where the daemon reads it from; rewritten with mode 0600.
    pub destination: PathBuf,
}

impl Default for KeyfileConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("/etc/mongo/keyfile"),
            destination: PathBuf::from("/data/db/keyfile"),
        }
    }
}

/// Daemon binary and extra flags.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    /// Daemon executable (resolved through `PATH` when relative).
    pub binary: String,

    /// Flags appended after `--replSet`, `--keyFile` and `--bind_ip_all`.
    pub extra_args: Vec<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            binary: "mongod".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Scripting client settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Client executable.
    pub binary: String,

    /// Host the client connects to.
    pub host: String,

    /// Port the client connects to.
    pub port: u16,

    /// Upper bound on a single client invocation in seconds.
    pub timeout_secs: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            binary: "mongosh".to_string(),
            host: "localhost".to_string(),
            port: 27017,
            timeout_secs: 30,
        }
    }
}

/// Replica-set name and members.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReplicaSetConfig {
    /// Set name passed to `--replSet` and used as the config `_id`.
    pub name: String,

    /// Member addresses (`host:port`), in member-id order.
    pub members: Vec<String>,
}

impl Default for ReplicaSetConfig {
    fn default() -> Self {
        Self {
            name: "rs0".to_string(),
            members: vec!["localhost:27017".to_string()],
        }
    }
}

/// Administrative user settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminUserConfig {
    /// Username to create.
    pub username: String,

    /// Password; no usable default, must come from the file or environment.
    pub password: String,

    /// Role granted on `database`.
    pub role: String,

    /// Authentication database the user lives in.
    pub database: String,
}

impl Default for AdminUserConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: String::new(),
            role: "root".to_string(),
            database: "admin".to_string(),
        }
    }
}

/// Bounded readiness polling.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Maximum `ping` attempts before giving up on the daemon.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Maximum attempts waiting for the node to become writable primary.
    pub primary_max_attempts: u32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            base_delay_ms: 250,
            max_delay_ms: 5000,
            primary_max_attempts: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Human-readable text or one JSON object per line.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl BootstrapConfig {
    /// Copy of the configuration safe to print or log.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.admin.password.is_empty() {
            copy.admin.password = "<redacted>".to_string();
        }
        copy
    }
}
