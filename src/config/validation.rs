//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the single member address and value ranges
//! - Reject missing credentials before anything touches the filesystem
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BootstrapConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::BootstrapConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("replica_set.members must list exactly one member, found {count}")]
    MemberCount { count: usize },

    #[error("replica_set.members[{index}] = {value:?} is not a host:port address")]
    InvalidMember { index: usize, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("readiness.base_delay_ms ({base}) exceeds readiness.max_delay_ms ({max})")]
    DelayOrder { base: u64, max: u64 },
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &BootstrapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        ("keyfile.source", config.keyfile.source.as_os_str().is_empty()),
        ("keyfile.destination", config.keyfile.destination.as_os_str().is_empty()),
        ("daemon.binary", config.daemon.binary.trim().is_empty()),
        ("shell.binary", config.shell.binary.trim().is_empty()),
        ("shell.host", config.shell.host.trim().is_empty()),
        ("replica_set.name", config.replica_set.name.trim().is_empty()),
        ("admin.username", config.admin.username.trim().is_empty()),
        ("admin.password", config.admin.password.is_empty()),
        ("admin.role", config.admin.role.trim().is_empty()),
        ("admin.database", config.admin.database.trim().is_empty()),
    ];
    for (field, empty) in required {
        if empty {
            errors.push(ValidationError::Empty { field });
        }
    }

    // Single-node sets only.
    if config.replica_set.members.len() != 1 {
        errors.push(ValidationError::MemberCount {
            count: config.replica_set.members.len(),
        });
    }
    for (index, member) in config.replica_set.members.iter().enumerate() {
        if !is_host_port(member) {
            errors.push(ValidationError::InvalidMember {
                index,
                value: member.clone(),
            });
        }
    }

    if config.shell.port == 0 {
        errors.push(ValidationError::Zero { field: "shell.port" });
    }
    if config.shell.timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "shell.timeout_secs",
        });
    }
    if config.readiness.max_attempts == 0 {
        errors.push(ValidationError::Zero {
            field: "readiness.max_attempts",
        });
    }
    if config.readiness.primary_max_attempts == 0 {
        errors.push(ValidationError::Zero {
            field: "readiness.primary_max_attempts",
        });
    }
    if config.readiness.base_delay_ms > config.readiness.max_delay_ms {
        errors.push(ValidationError::DelayOrder {
            base: config.readiness.base_delay_ms,
            max: config.readiness.max_delay_ms,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_host_port(value: &str) -> bool {
    match value.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok_and(|p| p > 0),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> BootstrapConfig {
        let mut config = BootstrapConfig::default();
        config.admin.password = "pw".into();
        config
    }

    #[test]
    fn test_defaults_with_password_are_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_default_config_requires_password() {
        let errors = validate_config(&BootstrapConfig::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::Empty {
                field: "admin.password"
            }]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.replica_set.name = " ".into();
        config.replica_set.members = vec!["nohost".into(), ":27017".into(), "db:0".into()];
        config.readiness.max_attempts = 0;
        config.readiness.base_delay_ms = 10_000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains(&ValidationError::MemberCount { count: 3 }));
        assert!(errors.contains(&ValidationError::Empty {
            field: "replica_set.name"
        }));
        assert!(errors.contains(&ValidationError::InvalidMember {
            index: 0,
            value: "nohost".into()
        }));
        assert!(errors.contains(&ValidationError::Zero {
            field: "readiness.max_attempts"
        }));
        assert!(errors.contains(&ValidationError::DelayOrder {
            base: 10_000,
            max: 5000
        }));
    }

    #[test]
    fn test_requires_exactly_one_member() {
        let mut config = valid();
        config.replica_set.members.clear();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MemberCount { count: 0 }]
        );

        config.replica_set.members = vec!["localhost:27017".into(), "other:27017".into()];
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MemberCount { count: 2 }]
        );
    }

    #[test]
    fn test_ipv6_style_member_accepted() {
        let mut config = valid();
        config.replica_set.members = vec!["[::1]:27017".into()];
        assert_eq!(validate_config(&config), Ok(()));
    }
}
