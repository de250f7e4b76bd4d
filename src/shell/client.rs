//! Scripting-client invocation.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::{AdminUserConfig, ShellConfig};
use crate::shell::command::{AdminCommand, Secret};
use crate::shell::reply::{CommandReply, UNAUTHORIZED};
use crate::shell::ShellError;

/// Issues admin commands to the daemon.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminClient: Send + Sync {
    /// Run one command and return the server's structured reply.
    ///
    /// An `Ok` reply may still carry `ok: 0`; only failures to obtain a reply
    /// at all are errors.
    async fn run(&self, command: &AdminCommand) -> Result<CommandReply, ShellError>;
}

/// Credentials used once the server stops accepting unauthenticated admin
/// commands (after the first user exists).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
    pub database: String,
}

impl From<&AdminUserConfig> for Credentials {
    fn from(config: &AdminUserConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: Secret::new(config.password.clone()),
            database: config.database.clone(),
        }
    }
}

/// [`AdminClient`] backed by the `mongosh` command-line tool.
#[derive(Debug, Clone)]
pub struct MongoShell {
    config: ShellConfig,
    credentials: Option<Credentials>,
}

impl MongoShell {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config,
            credentials: None,
        }
    }

    /// Retry `Unauthorized` replies once with these credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Arguments for one invocation, without the binary.
    pub fn args(&self, command: &AdminCommand, credentials: Option<&Credentials>) -> Vec<String> {
        let mut args = vec![
            "--quiet".to_string(),
            "--host".to_string(),
            self.config.host.clone(),
            "--port".to_string(),
            self.config.port.to_string(),
        ];
        if let Some(credentials) = credentials {
            args.extend([
                "--username".to_string(),
                credentials.username.clone(),
                "--password".to_string(),
                credentials.password.expose().to_string(),
                "--authenticationDatabase".to_string(),
                credentials.database.clone(),
            ]);
        }
        args.push("--eval".to_string());
        args.push(command.to_script());
        args
    }

    async fn invoke(
        &self,
        command: &AdminCommand,
        credentials: Option<&Credentials>,
    ) -> Result<CommandReply, ShellError> {
        let mut process = Command::new(&self.config.binary);
        process
            .args(self.args(command, credentials))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout(), process.output()).await {
            Ok(result) => result.map_err(|source| ShellError::Spawn {
                binary: self.config.binary.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ShellError::Timeout {
                    command: command.name(),
                    secs: self.config.timeout_secs,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        match CommandReply::from_output(&stdout) {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(source)) => Err(ShellError::MalformedReply {
                command: command.name(),
                output: stdout.trim().to_string(),
                source,
            }),
            None => Err(ShellError::Failed {
                command: command.name(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

#[async_trait]
impl AdminClient for MongoShell {
    async fn run(&self, command: &AdminCommand) -> Result<CommandReply, ShellError> {
        let reply = self.invoke(command, None).await?;

        match &self.credentials {
            Some(credentials) if reply.has_code(UNAUTHORIZED) => {
                tracing::debug!(
                    command = command.name(),
                    user = %credentials.username,
                    "Unauthenticated command rejected, retrying with credentials"
                );
                self.invoke(command, Some(credentials)).await
            }
            _ => Ok(reply),
        }
    }
}
