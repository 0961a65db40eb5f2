use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::error::LoggerError;
use crate::format::LoggerFormat;

/// `EnvFilter` directive, e.g. `info` or `rollwatch_core=debug,info`.
pub const LEVEL_VAR: &str = "ROLLWATCH_LOG_LEVEL";
/// `text`, `json` or `journald`.
pub const FORMAT_VAR: &str = "ROLLWATCH_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub filter: String,
    pub with_targets: bool,
    /// ANSI colors; text output only.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            filter: DEFAULT_FILTER.to_string(),
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
        }
    }
}

impl LoggerConfig {
    /// Resolve [`LEVEL_VAR`] and [`FORMAT_VAR`] from `lookup`.
    ///
    /// Everything [`crate::logger_init`] could reject, apart from a second
    /// install, is rejected here so a bad setting stops the agent before it
    /// does any work.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggerError> {
        let set = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut cfg = Self::default();
        if let Some(filter) = set(LEVEL_VAR) {
            cfg.filter = filter;
        }
        if let Some(format) = set(FORMAT_VAR) {
            cfg.format = format.parse()?;
        }
        if !cfg.format.is_available() {
            return Err(LoggerError::JournaldUnavailable);
        }
        cfg.env_filter()?;

        if cfg.format != LoggerFormat::Text {
            cfg.use_color = false;
        }
        Ok(cfg)
    }

    pub(crate) fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(&self.filter).map_err(|e| LoggerError::BadFilter {
            filter: self.filter.clone(),
            reason: e.to_string(),
        })
    }
}
