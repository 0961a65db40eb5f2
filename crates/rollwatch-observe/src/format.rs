use std::fmt;
use std::str::FromStr;

use crate::error::LoggerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerFormat {
    Text,
    Json,
    Journald,
}

impl LoggerFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }

    /// Whether this build can emit the format.
    pub fn is_available(self) -> bool {
        match self {
            LoggerFormat::Journald => cfg!(all(target_os = "linux", feature = "journald")),
            LoggerFormat::Text | LoggerFormat::Json => true,
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; `journal` is accepted for journald.
impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LoggerFormat::Text),
            "json" => Ok(LoggerFormat::Json),
            "journald" | "journal" => Ok(LoggerFormat::Journald),
            _ => Err(LoggerError::UnknownFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FORMAT_VAR;

    #[test]
    fn parses_names_and_alias() {
        assert_eq!(" JSON ".parse::<LoggerFormat>().unwrap(), LoggerFormat::Json);
        assert_eq!("Journal".parse::<LoggerFormat>().unwrap(), LoggerFormat::Journald);
        assert_eq!(LoggerFormat::Journald.to_string(), "journald");
    }

    #[test]
    fn unknown_format_names_variable_and_choices() {
        let err = "yaml".parse::<LoggerFormat>().unwrap_err();
        assert!(matches!(err, LoggerError::UnknownFormat(ref s) if s == "yaml"));

        let text = err.to_string();
        assert!(text.starts_with(FORMAT_VAR));
        assert!(text.contains("text, json or journald"));
    }

    #[test]
    fn plain_formats_are_always_available() {
        assert!(LoggerFormat::Text.is_available());
        assert!(LoggerFormat::Json.is_available());
    }
}
