//! Chat-webhook notifier.
//!
//! Sends plain-text messages (JSON body) and archive uploads (multipart form)
//! to a single webhook endpoint, honouring the endpoint's rate-limit headers.
//! An unconfigured endpoint turns every call into a silent `false`.

mod config;
pub use config::WebhookConfig;

mod errors;
pub use errors::NotifyError;

mod notifier;
pub use notifier::Notify;

mod webhook;
pub use webhook::{RateLimitWindow, WebhookNotifier};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
