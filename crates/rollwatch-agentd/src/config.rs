use std::path::PathBuf;

use rollwatch_core::MonitorConfig;
use rollwatch_model::{DEFAULT_LOOKUP_BASE, ExamConfig};
use rollwatch_notify::WebhookConfig;
use rollwatch_observe::LoggerConfig;
use rollwatch_render::BrowserSettings;

pub const ENV_WEBHOOK: &str = "DISCORD_WEBHOOK_URL";
pub const ENV_ROSTER_FILE: &str = "ROLLWATCH_ROSTER_FILE";
pub const ENV_CHROME: &str = "ROLLWATCH_CHROME";
pub const ENV_NO_SANDBOX: &str = "ROLLWATCH_NO_SANDBOX";

/// Everything the daemon needs, resolved from the environment.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub logger: LoggerConfig,
    pub webhook: WebhookConfig,
    pub browser: BrowserSettings,
    pub roster_file: Option<PathBuf>,
    pub lookup_base: String,
    pub exam: ExamConfig,
    pub monitor: MonitorConfig,
}

impl AgentConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let logger = LoggerConfig::from_vars(&var)?;

        let webhook = WebhookConfig {
            endpoint: var(ENV_WEBHOOK),
            ..WebhookConfig::default()
        };

        let browser = BrowserSettings {
            executable: var(ENV_CHROME).map(PathBuf::from),
            sandbox: var(ENV_NO_SANDBOX).is_none_or(|v| v.trim() != "1"),
            ..BrowserSettings::default()
        };

        Ok(Self {
            logger,
            webhook,
            browser,
            roster_file: var(ENV_ROSTER_FILE).map(PathBuf::from),
            lookup_base: DEFAULT_LOOKUP_BASE.to_string(),
            exam: ExamConfig::default(),
            monitor: MonitorConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rollwatch_observe::{FORMAT_VAR, LEVEL_VAR, LoggerFormat};

    use super::*;

    fn from(pairs: &[(&str, &str)]) -> anyhow::Result<AgentConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AgentConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = from(&[]).unwrap();
        assert!(cfg.webhook.endpoint().is_none());
        assert_eq!(cfg.logger.filter, "info");
        assert_eq!(cfg.logger.format, LoggerFormat::Text);
        assert!(cfg.browser.sandbox);
        assert!(cfg.roster_file.is_none());
        assert_eq!(cfg.monitor, MonitorConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let cfg = from(&[
            (ENV_WEBHOOK, "https://discord.com/api/webhooks/1/abc"),
            (LEVEL_VAR, "rollwatch_core=debug,info"),
            (FORMAT_VAR, "JSON"),
            (ENV_ROSTER_FILE, "/etc/rollwatch/roster.txt"),
            (ENV_CHROME, "/usr/bin/chromium"),
            (ENV_NO_SANDBOX, "1"),
        ])
        .unwrap();

        assert_eq!(cfg.webhook.endpoint(), Some("https://discord.com/api/webhooks/1/abc"));
        assert_eq!(cfg.logger.filter, "rollwatch_core=debug,info");
        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.roster_file, Some(PathBuf::from("/etc/rollwatch/roster.txt")));
        assert_eq!(cfg.browser.executable, Some(PathBuf::from("/usr/bin/chromium")));
        assert!(!cfg.browser.sandbox);
    }

    #[test]
    fn blank_webhook_is_unconfigured() {
        let cfg = from(&[(ENV_WEBHOOK, "   ")]).unwrap();
        assert!(cfg.webhook.endpoint.is_none());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = from(&[(FORMAT_VAR, "xml")]).unwrap_err();
        assert!(err.to_string().contains(FORMAT_VAR));
        assert!(err.to_string().contains("\"xml\""));
    }
}
