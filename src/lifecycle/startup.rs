//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the keyfile, launch the daemon, wait for it
//! - Initiate the replica set and provision the admin user
//! - Stay attached to the daemon and hand back its exit status
//!
//! # Design Decisions
//! - Fail fast: any error before the daemon is launched is fatal and leaves
//!   nothing running
//! - After launch, a fatal error stops the daemon before returning, unless
//!   the daemon already exited, whose status then wins
//! - Steps run in order, never concurrently

use std::process::ExitStatus;

use crate::config::validation::validate_config;
use crate::config::{BootstrapConfig, ConfigError};
use crate::daemon::DaemonProcess;
use crate::error::BootstrapError;
use crate::keyfile::install_keyfile;
use crate::lifecycle::admin_user::provision_admin_user;
use crate::lifecycle::readiness::{wait_for_daemon, wait_for_primary};
use crate::lifecycle::replica_set::{initiate_replica_set, verify_topology};
use crate::lifecycle::signals::{supervise, ShutdownSignals};
use crate::lifecycle::BootstrapPhase;
use crate::resilience::RetryPolicy;
use crate::shell::{AdminClient, Credentials, MongoShell};

/// Run the whole bootstrap with the `mongosh`-backed client.
pub async fn run(config: &BootstrapConfig) -> Result<ExitStatus, BootstrapError> {
    let client = MongoShell::new(config.shell.clone())
        .with_credentials(Credentials::from(&config.admin));
    run_with_client(config, &client).await
}

/// Run the whole bootstrap against any [`AdminClient`].
///
/// The configuration is validated again first, since callers may build it by
/// hand instead of going through [`crate::config::load_config`].
///
/// Returns the daemon's exit status once it stops.
pub async fn run_with_client<C>(
    config: &BootstrapConfig,
    client: &C,
) -> Result<ExitStatus, BootstrapError>
where
    C: AdminClient + ?Sized,
{
    validate_config(config).map_err(ConfigError::Validation)?;

    let mut phase = BootstrapPhase::NotStarted;
    let mut signals = ShutdownSignals::install().map_err(BootstrapError::Signals)?;

    phase = phase.advance(BootstrapPhase::Initializing);
    let keyfile = install_keyfile(&config.keyfile.source, &config.keyfile.destination).await?;
    let mut daemon = DaemonProcess::spawn(&config.daemon, &config.replica_set.name, &keyfile)?;

    let initialized = tokio::select! {
        result = initialize(config, client, &mut daemon) => result,
        received = signals.recv() => Err(BootstrapError::Interrupted(received)),
    };
    if let Err(err) = initialized {
        return Err(abort(&mut daemon, err).await);
    }

    phase.advance(BootstrapPhase::Ready);
    tracing::info!(
        pid = daemon.pid(),
        set = %config.replica_set.name,
        "Bootstrap complete, attached to daemon"
    );

    Ok(supervise(&mut daemon, &mut signals).await?)
}

/// Everything between launch and reattachment.
async fn initialize<C>(
    config: &BootstrapConfig,
    client: &C,
    daemon: &mut DaemonProcess,
) -> Result<(), BootstrapError>
where
    C: AdminClient + ?Sized,
{
    wait_for_daemon(client, daemon, RetryPolicy::readiness(&config.readiness)).await?;
    initiate_replica_set(client, &config.replica_set).await?;
    verify_topology(client, &config.replica_set).await?;
    wait_for_primary(client, daemon, RetryPolicy::primary(&config.readiness)).await?;
    provision_admin_user(client, &config.admin).await?;
    Ok(())
}

/// Turn a failed bootstrap into its final error, stopping the daemon if it is
/// still running.
async fn abort(daemon: &mut DaemonProcess, err: BootstrapError) -> BootstrapError {
    match daemon.try_exit_status() {
        Ok(Some(status)) => {
            tracing::error!(%status, error = %err, "Daemon exited during bootstrap");
            return BootstrapError::DaemonExited(status);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Could not check daemon status"),
    }

    tracing::error!(error = %err, pid = daemon.pid(), "Bootstrap failed, stopping daemon");
    if let Err(e) = daemon.terminate().await {
        tracing::warn!(error = %e, "Failed to stop daemon");
    }
    err
}
