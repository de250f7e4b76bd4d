//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::BootstrapConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "REPLSET_";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "IO error reading {}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load configuration from an optional TOML file, apply `REPLSET_*`
/// environment overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<BootstrapConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an injectable environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<BootstrapConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content =
                fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
            parse_config(&content)?
        }
        None => BootstrapConfig::default(),
    };

    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse TOML content without validating it.
pub fn parse_config(content: &str) -> Result<BootstrapConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Overlay environment variables onto a parsed configuration.
///
/// Empty values are ignored so an unset-but-exported variable does not wipe
/// a value from the file.
pub fn apply_env_overrides<F>(config: &mut BootstrapConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| env(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());

    if let Some(v) = lookup("KEYFILE_SOURCE") {
        config.keyfile.source = PathBuf::from(v);
    }
    if let Some(v) = lookup("KEYFILE_DESTINATION") {
        config.keyfile.destination = PathBuf::from(v);
    }
    if let Some(v) = lookup("DAEMON_BIN") {
        config.daemon.binary = v;
    }
    if let Some(v) = lookup("SHELL_BIN") {
        config.shell.binary = v;
    }
    if let Some(v) = lookup("SET_NAME") {
        config.replica_set.name = v;
    }
    if let Some(v) = lookup("ADMIN_USERNAME") {
        config.admin.username = v;
    }
    if let Some(v) = lookup("ADMIN_PASSWORD") {
        config.admin.password = v;
    }
    if let Some(v) = lookup("ADMIN_ROLE") {
        config.admin.role = v;
    }
    if let Some(v) = lookup("LOG_LEVEL") {
        config.observability.log_level = v;
    }
}
