//! Logging bootstrap for the rollwatch agent.
//!
//! [`LoggerConfig::from_vars`] resolves and validates the log settings from
//! the environment, then [`logger_init`] installs the global `tracing`
//! subscriber. Output is human-readable text, line-delimited JSON, or
//! journald (Linux with the `journald` feature).

mod config;
pub use config::{FORMAT_VAR, LEVEL_VAR, LoggerConfig};

mod error;
pub use error::LoggerError;

mod format;
pub use format::LoggerFormat;

mod install;
pub use install::logger_init;
