//! Replica-set initiation and topology check.

use crate::config::ReplicaSetConfig;
use crate::error::BootstrapError;
use crate::shell::reply::ALREADY_INITIALIZED;
use crate::shell::{AdminClient, AdminCommand, Outcome, ReplicaSetSpec};

/// Issue `replSetInitiate` for the configured topology.
///
/// `AlreadyInitialized` counts as success; every other rejection is fatal.
pub async fn initiate_replica_set<C>(
    client: &C,
    config: &ReplicaSetConfig,
) -> Result<Outcome, BootstrapError>
where
    C: AdminClient + ?Sized,
{
    let command = AdminCommand::ReplSetInitiate(ReplicaSetSpec::from(config));
    let reply = client.run(&command).await?;
    let outcome = reply.classify(command.name(), ALREADY_INITIALIZED)?;

    match outcome {
        Outcome::Applied => tracing::info!(
            set = %config.name,
            members = ?config.members,
            "Replica set initiated"
        ),
        Outcome::AlreadyDone => tracing::info!(
            set = %config.name,
            "Replica set already initialized"
        ),
    }
    Ok(outcome)
}

/// Compare the active configuration's name and member hosts with ours.
///
/// Run after initiation so an "already initialized" set with a different
/// topology is reported instead of silently accepted.
pub async fn verify_topology<C>(client: &C, config: &ReplicaSetConfig) -> Result<(), BootstrapError>
where
    C: AdminClient + ?Sized,
{
    let command = AdminCommand::ReplSetGetConfig;
    let reply = client.run(&command).await?.into_result(command.name())?;

    let active = reply
        .field("config")
        .ok_or_else(|| BootstrapError::UnexpectedReply {
            command: command.name(),
            detail: "missing config document".to_string(),
        })?;

    let name = active.get("_id").and_then(|v| v.as_str()).unwrap_or_default();
    let actual: Vec<String> = active
        .get("members")
        .and_then(|m| m.as_array())
        .map(|members| {
            members
                .iter()
                .filter_map(|m| m.get("host").and_then(|h| h.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if name != config.name || actual != config.members {
        return Err(BootstrapError::TopologyMismatch {
            set: name.to_string(),
            expected: config.members.clone(),
            actual,
        });
    }

    tracing::debug!(set = %name, members = actual.len(), "Replica-set topology verified");
    Ok(())
}
