use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Webhook URL. `None` (or empty) disables delivery entirely.
    pub endpoint: Option<String>,
    /// Display name sent with every post.
    pub username: String,
    /// Timeout for text messages.
    pub message_timeout: Duration,
    /// Timeout for archive uploads (large multipart bodies).
    pub upload_timeout: Duration,
    /// Wait applied to a 429 that carries no retry hint.
    pub default_retry_after: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            username: "BEU Monitor".to_string(),
            message_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(600),
            default_retry_after: Duration::from_secs(1),
        }
    }
}

impl WebhookConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Configured endpoint, treating an empty string as absent.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_endpoint_counts_as_unconfigured() {
        assert!(WebhookConfig::default().endpoint().is_none());
        assert!(WebhookConfig::with_endpoint("  ").endpoint().is_none());
        assert_eq!(
            WebhookConfig::with_endpoint("https://hooks.example/abc").endpoint(),
            Some("https://hooks.example/abc")
        );
    }
}
