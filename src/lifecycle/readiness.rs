//! Readiness polling against the live daemon.
//!
//! Both waits also watch the daemon process: if it exits while we poll, the
//! wait fails with its exit status instead of burning the remaining attempts.

use crate::daemon::DaemonProcess;
use crate::error::BootstrapError;
use crate::resilience::{poll_until, Attempt, RetryError, RetryPolicy};
use crate::shell::{AdminClient, AdminCommand};

/// Wait until the daemon answers `ping`.
pub async fn wait_for_daemon<C>(
    client: &C,
    daemon: &mut DaemonProcess,
    policy: RetryPolicy,
) -> Result<(), BootstrapError>
where
    C: AdminClient + ?Sized,
{
    let result = poll_until(policy, "daemon", |_| {
        let exited = daemon.try_exit_status();
        async move {
            if let Some(err) = exit_failure(exited) {
                return Attempt::Fail(err);
            }
            match client.run(&AdminCommand::Ping).await {
                Ok(reply) if reply.is_ok() => Attempt::Ready(()),
                Ok(reply) => Attempt::Pending(reply.describe()),
                Err(e) => Attempt::Pending(e.to_string()),
            }
        }
    })
    .await;

    flatten(result)?;
    tracing::info!(pid = daemon.pid(), "Daemon accepting commands");
    Ok(())
}

/// Wait until the node reports itself writable primary.
pub async fn wait_for_primary<C>(
    client: &C,
    daemon: &mut DaemonProcess,
    policy: RetryPolicy,
) -> Result<(), BootstrapError>
where
    C: AdminClient + ?Sized,
{
    let result = poll_until(policy, "primary", |_| {
        let exited = daemon.try_exit_status();
        async move {
            if let Some(err) = exit_failure(exited) {
                return Attempt::Fail(err);
            }
            match client.run(&AdminCommand::Hello).await {
                Ok(reply) if !reply.is_ok() => Attempt::Pending(reply.describe()),
                Ok(reply) => match reply.field("isWritablePrimary").and_then(|v| v.as_bool()) {
                    Some(true) => Attempt::Ready(()),
                    _ => Attempt::Pending("not yet writable primary".to_string()),
                },
                Err(e) => Attempt::Pending(e.to_string()),
            }
        }
    })
    .await;

    flatten(result)?;
    tracing::info!("Node is writable primary");
    Ok(())
}

fn exit_failure(
    exited: Result<Option<std::process::ExitStatus>, crate::daemon::DaemonError>,
) -> Option<BootstrapError> {
    match exited {
        Ok(None) => None,
        Ok(Some(status)) => Some(BootstrapError::DaemonExited(status)),
        Err(e) => Some(e.into()),
    }
}

fn flatten(result: Result<(), RetryError<BootstrapError>>) -> Result<(), BootstrapError> {
    result.map_err(|e| match e {
        RetryError::Exhausted {
            what,
            attempts,
            last,
        } => BootstrapError::NotReady {
            what,
            attempts,
            last,
        },
        RetryError::Aborted(e) => e,
    })
}
