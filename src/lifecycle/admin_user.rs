//! Administrative user provisioning.

use crate::config::AdminUserConfig;
use crate::error::BootstrapError;
use crate::shell::reply::USER_ALREADY_EXISTS;
use crate::shell::{AdminClient, AdminCommand, Outcome};

/// Issue `createUser` for the configured admin.
///
/// A user-already-exists reply counts as success; the existing user's roles
/// and password are left untouched.
pub async fn provision_admin_user<C>(
    client: &C,
    config: &AdminUserConfig,
) -> Result<Outcome, BootstrapError>
where
    C: AdminClient + ?Sized,
{
    let command = AdminCommand::create_user(config);
    let reply = client.run(&command).await?;
    let outcome = reply.classify(command.name(), USER_ALREADY_EXISTS)?;

    match outcome {
        Outcome::Applied => tracing::info!(
            user = %config.username,
            role = %config.role,
            db = %config.database,
            "Admin user created"
        ),
        Outcome::AlreadyDone => tracing::info!(user = %config.username, "Admin user already exists"),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::command::RoleGrant;
    use crate::shell::{CommandReply, MockAdminClient};

    fn admin() -> AdminUserConfig {
        AdminUserConfig {
            password: "pw".into(),
            ..AdminUserConfig::default()
        }
    }

    fn replying(reply: CommandReply) -> MockAdminClient {
        let mut client = MockAdminClient::new();
        client.expect_run().times(1).returning(move |_| Ok(reply.clone()));
        client
    }

    #[tokio::test]
    async fn test_creates_superuser_on_admin_db() {
        let mut client = MockAdminClient::new();
        client
            .expect_run()
            .withf(|command| match command {
                AdminCommand::CreateUser {
                    username,
                    password,
                    roles,
                    database,
                } => {
                    username == "admin"
                        && password.expose() == "pw"
                        && database == "admin"
                        && roles
                            == &vec![RoleGrant {
                                role: "root".into(),
                                db: "admin".into(),
                            }]
                }
                _ => false,
            })
            .times(1)
            .returning(|_| Ok(CommandReply::success()));

        let outcome = provision_admin_user(&client, &admin()).await.unwrap();

        assert_eq!(outcome, Outcome::Applied);
    }

    #[tokio::test]
    async fn test_existing_user_is_tolerated() {
        let client = replying(CommandReply::error(
            USER_ALREADY_EXISTS,
            "Location51003",
            "User \"admin@admin\" already exists",
        ));
        let outcome = provision_admin_user(&client, &admin()).await.unwrap();
        assert_eq!(outcome, Outcome::AlreadyDone);
    }

    #[tokio::test]
    async fn test_auth_failure_is_fatal() {
        let client = replying(CommandReply::error(18, "AuthenticationFailed", "Authentication failed."));
        let err = provision_admin_user(&client, &admin()).await.unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("createUser failed"));
    }
}
