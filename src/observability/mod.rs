//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → container log driver (stderr, text or JSON lines)
//! ```

pub mod logging;

pub use logging::{init_logging, LoggingError};
