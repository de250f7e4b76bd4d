//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (REPLSET_* environment overrides)
//!     → validation.rs (semantic checks)
//!     → BootstrapConfig (validated, immutable)
//!     → borrowed by every bootstrap step
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs; only the admin
//!   password must be supplied
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminUserConfig, BootstrapConfig, DaemonConfig, KeyfileConfig, LogFormat,
    ObservabilityConfig, ReadinessConfig, ReplicaSetConfig, ShellConfig,
};
