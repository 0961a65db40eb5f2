use thiserror::Error;

use crate::config::{FORMAT_VAR, LEVEL_VAR};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("{}={:?}: unknown log format, expected text, json or journald", FORMAT_VAR, .0)]
    UnknownFormat(String),

    #[error("{}={:?}: {reason}", LEVEL_VAR, .filter)]
    BadFilter { filter: String, reason: String },

    #[error("journald output needs a Linux build with the `journald` feature")]
    JournaldUnavailable,

    #[error("cannot reach the journald socket: {0}")]
    Journald(String),

    #[error("a global log subscriber is already installed")]
    AlreadyInstalled,
}
