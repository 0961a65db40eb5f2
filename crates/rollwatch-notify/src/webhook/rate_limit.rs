use std::time::Duration;

use reqwest::header::HeaderMap;
use tokio::time::Instant;

pub(crate) const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub(crate) const RESET_AFTER_HEADER: &str = "x-ratelimit-reset-after";
pub(crate) const RETRY_AFTER_HEADER: &str = "retry-after";

/// Budget assumed when a response does not report one.
const DEFAULT_REMAINING: u32 = 5;

/// Last rate-limit state reported by the webhook.
///
/// Updated from every response and consulted before every send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    remaining: u32,
    reset_at: Option<Instant>,
}

impl Default for RateLimitWindow {
    fn default() -> Self {
        Self {
            remaining: DEFAULT_REMAINING,
            reset_at: None,
        }
    }
}

impl RateLimitWindow {
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn reset_at(&self) -> Option<Instant> {
        self.reset_at
    }

    /// Record a response's rate-limit headers.
    ///
    /// `sent_at` anchors the relative reset hint. A missing remaining count
    /// falls back to the default budget; a missing reset hint keeps the
    /// previous deadline.
    pub fn observe(&mut self, headers: &HeaderMap, sent_at: Instant) {
        self.remaining = header_value::<u32>(headers, REMAINING_HEADER).unwrap_or(DEFAULT_REMAINING);
        if let Some(reset_after) = header_secs(headers, RESET_AFTER_HEADER) {
            self.reset_at = Some(sent_at + reset_after);
        }
    }

    /// How long to hold the next send: only when the budget is spent and the
    /// reset deadline is still ahead.
    pub fn wait_needed(&self, now: Instant) -> Option<Duration> {
        if self.remaining > 0 {
            return None;
        }
        self.reset_at
            .filter(|reset| *reset > now)
            .map(|reset| reset - now)
    }
}

pub(crate) fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Parse a header carrying fractional seconds (`"0.25"`, `"3"`).
pub(crate) fn header_secs(headers: &HeaderMap, name: &str) -> Option<Duration> {
    header_value::<f64>(headers, name).and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
