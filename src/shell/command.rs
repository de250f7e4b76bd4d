//! Admin commands issued through the scripting client.
//!
//! Each command serializes to a JSON document whose first key is the command
//! name, which is what the server dispatches on. Field order follows the
//! struct declarations below.

use std::fmt;

use serde::Serialize;

use crate::config::{AdminUserConfig, ReplicaSetConfig};

/// Password wrapper that never prints its contents.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// One member of a replica-set configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSpec {
    #[serde(rename = "_id")]
    pub id: u32,
    pub host: String,
}

/// The replica-set configuration document passed to `replSetInitiate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaSetSpec {
    #[serde(rename = "_id")]
    pub name: String,
    pub members: Vec<MemberSpec>,
}

impl From<&ReplicaSetConfig> for ReplicaSetSpec {
    fn from(config: &ReplicaSetConfig) -> Self {
        Self {
            name: config.name.clone(),
            members: config
                .members
                .iter()
                .enumerate()
                .map(|(id, host)| MemberSpec {
                    id: id as u32,
                    host: host.clone(),
                })
                .collect(),
        }
    }
}

/// A role granted on a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleGrant {
    pub role: String,
    pub db: String,
}

/// Commands this program knows how to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Liveness probe; allowed without authentication.
    Ping,
    /// Topology probe; reports `isWritablePrimary`.
    Hello,
    /// One-time replica-set formation.
    ReplSetInitiate(ReplicaSetSpec),
    /// Read back the active replica-set configuration.
    ReplSetGetConfig,
    /// One-time admin user creation.
    CreateUser {
        username: String,
        password: Secret,
        roles: Vec<RoleGrant>,
        database: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PingDoc {
    ping: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HelloDoc {
    hello: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitiateDoc<'a> {
    repl_set_initiate: &'a ReplicaSetSpec,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetConfigDoc {
    repl_set_get_config: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserDoc<'a> {
    create_user: &'a str,
    pwd: &'a Secret,
    roles: &'a [RoleGrant],
}

impl AdminCommand {
    /// Build the `createUser` command from the admin user settings.
    pub fn create_user(config: &AdminUserConfig) -> Self {
        AdminCommand::CreateUser {
            username: config.username.clone(),
            password: Secret::new(config.password.clone()),
            roles: vec![RoleGrant {
                role: config.role.clone(),
                db: config.database.clone(),
            }],
            database: config.database.clone(),
        }
    }

    /// Command name as the server knows it.
    pub fn name(&self) -> &'static str {
        match self {
            AdminCommand::Ping => "ping",
            AdminCommand::Hello => "hello",
            AdminCommand::ReplSetInitiate(_) => "replSetInitiate",
            AdminCommand::ReplSetGetConfig => "replSetGetConfig",
            AdminCommand::CreateUser { .. } => "createUser",
        }
    }

    /// Database the command runs against.
    pub fn database(&self) -> &str {
        match self {
            AdminCommand::CreateUser { database, .. } => database,
            _ => "admin",
        }
    }

    /// Serialize to the JSON command document.
    pub fn to_json(&self) -> String {
        let rendered = match self {
            AdminCommand::Ping => serde_json::to_string(&PingDoc { ping: 1 }),
            AdminCommand::Hello => serde_json::to_string(&HelloDoc { hello: 1 }),
            AdminCommand::ReplSetInitiate(spec) => serde_json::to_string(&InitiateDoc {
                repl_set_initiate: spec,
            }),
            AdminCommand::ReplSetGetConfig => serde_json::to_string(&GetConfigDoc {
                repl_set_get_config: 1,
            }),
            AdminCommand::CreateUser {
                username,
                password,
                roles,
                ..
            } => serde_json::to_string(&CreateUserDoc {
                create_user: username,
                pwd: password,
                roles,
            }),
        };
        // Plain structs of strings and integers always serialize.
        rendered.unwrap_or_default()
    }

    /// Script evaluated by the client tool.
    ///
    /// Thrown server errors are caught and reduced to their structured fields
    /// so every outcome prints exactly one Extended JSON line.
    pub fn to_script(&self) -> String {
        let database = serde_json::to_string(self.database()).unwrap_or_default();
        format!(
            "let reply;\n\
             try {{\n  reply = db.getSiblingDB({database}).runCommand({command});\n}} \
             catch (e) {{\n  reply = {{ ok: 0, code: e.code, codeName: e.codeName, errmsg: e.message }};\n}}\n\
             print(EJSON.stringify(reply, {{ relaxed: true }}));\n",
            command = self.to_json(),
        )
    }
}
