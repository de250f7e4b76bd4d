//! Structured command replies and their classification.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// `Unauthorized`: the command needs an authenticated connection.
pub const UNAUTHORIZED: i32 = 13;
/// `AlreadyInitialized`: `replSetInitiate` on an initiated node.
pub const ALREADY_INITIALIZED: i32 = 23;
/// `createUser` for a name that is already taken.
pub const USER_ALREADY_EXISTS: i32 = 51003;

/// A server reply as printed by the client tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandReply {
    pub ok: f64,

    #[serde(default)]
    pub code: Option<i32>,

    #[serde(default, rename = "codeName")]
    pub code_name: Option<String>,

    #[serde(default)]
    pub errmsg: Option<String>,

    /// Everything else the command returned.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A command the server rejected for a reason we do not tolerate.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{command} failed: {} (code {}, {})",
    .errmsg.as_deref().unwrap_or("no error message"),
    .code.map_or_else(|| "none".to_string(), |c| c.to_string()),
    .code_name.as_deref().unwrap_or("unnamed"))]
pub struct CommandFailed {
    pub command: &'static str,
    pub code: Option<i32>,
    pub code_name: Option<String>,
    pub errmsg: Option<String>,
}

/// Result of a mutating command that tolerates "already done".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command changed server state.
    Applied,
    /// The server reported the exact already-done code.
    AlreadyDone,
}

impl CommandReply {
    #[cfg(test)]
    pub fn success() -> Self {
        Self {
            ok: 1.0,
            code: None,
            code_name: None,
            errmsg: None,
            fields: Map::new(),
        }
    }

    #[cfg(test)]
    pub fn error(code: i32, code_name: &str, errmsg: &str) -> Self {
        Self {
            ok: 0.0,
            code: Some(code),
            code_name: Some(code_name.to_string()),
            errmsg: Some(errmsg.to_string()),
            fields: Map::new(),
        }
    }

    #[cfg(test)]
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Parse the last JSON object line from client output.
    ///
    /// The client may print connection banners or deprecation warnings first.
    pub fn from_output(stdout: &str) -> Option<Result<Self, serde_json::Error>> {
        stdout
            .lines()
            .map(str::trim)
            .rev()
            .find(|line| line.starts_with('{'))
            .map(serde_json::from_str)
    }

    pub fn is_ok(&self) -> bool {
        self.ok == 1.0
    }

    pub fn has_code(&self, code: i32) -> bool {
        !self.is_ok() && self.code == Some(code)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Convert to an error description for `command`.
    pub fn failure(&self, command: &'static str) -> CommandFailed {
        CommandFailed {
            command,
            code: self.code,
            code_name: self.code_name.clone(),
            errmsg: self.errmsg.clone(),
        }
    }

    /// Success or a [`CommandFailed`] for anything else.
    pub fn into_result(self, command: &'static str) -> Result<Self, CommandFailed> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(self.failure(command))
        }
    }

    /// Classify a mutating command's reply, accepting exactly one
    /// already-done code as success.
    pub fn classify(&self, command: &'static str, already_done: i32) -> Result<Outcome, CommandFailed> {
        if self.is_ok() {
            Ok(Outcome::Applied)
        } else if self.has_code(already_done) {
            Ok(Outcome::AlreadyDone)
        } else {
            Err(self.failure(command))
        }
    }

    /// Short human description for logs.
    pub fn describe(&self) -> String {
        if self.is_ok() {
            "ok".to_string()
        } else {
            self.failure("command").to_string()
        }
    }
}
