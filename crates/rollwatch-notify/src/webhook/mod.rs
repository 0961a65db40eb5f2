mod rate_limit;
pub use rate_limit::RateLimitWindow;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, multipart};
use serde::Serialize;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::config::WebhookConfig;
use crate::errors::NotifyError;
use crate::notifier::Notify;
use rate_limit::{RETRY_AFTER_HEADER, header_secs};

const ARCHIVE_MIME: &str = "application/zip";

#[derive(Serialize)]
struct MessagePayload<'a> {
    content: &'a str,
    username: &'a str,
}

/// [`Notify`] implementation posting to a Discord-style webhook.
///
/// Owns the rate-limit window exclusively; the window is refreshed from every
/// response and a spent budget delays the next send until its reset deadline.
/// A 429 is retried after the server-specified delay for as long as the
/// server keeps answering 429; every other failure is reported once as `false`.
pub struct WebhookNotifier {
    config: WebhookConfig,
    client: Client,
    window: Mutex<RateLimitWindow>,
    rate_limit_retries: AtomicU32,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, NotifyError> {
        if let Some(endpoint) = config.endpoint() {
            reqwest::Url::parse(endpoint)
                .map_err(|e| NotifyError::InvalidEndpoint(format!("{e}")))?;
        }
        let client = Client::builder()
            .user_agent(concat!("rollwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config,
            client,
            window: Mutex::new(RateLimitWindow::default()),
            rate_limit_retries: AtomicU32::new(0),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.endpoint().is_some()
    }

    /// Number of 429 responses retried since construction.
    pub fn rate_limit_retries(&self) -> u32 {
        self.rate_limit_retries.load(Ordering::Relaxed)
    }

    /// Snapshot of the cached rate-limit state.
    pub fn rate_limit_window(&self) -> RateLimitWindow {
        *self.window()
    }

    fn window(&self) -> MutexGuard<'_, RateLimitWindow> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn wait_for_budget(&self) {
        let wait = self.window().wait_needed(Instant::now());
        if let Some(wait) = wait {
            debug!(wait_ms = wait.as_millis() as u64, "rate-limit budget spent; holding send");
            sleep(wait).await;
        }
    }

    /// Server-directed delay for a 429: `Retry-After` header, then the JSON
    /// body's `retry_after`, then the configured default.
    async fn retry_delay(&self, response: Response) -> Duration {
        if let Some(delay) = header_secs(response.headers(), RETRY_AFTER_HEADER) {
            return delay;
        }
        let body = response.text().await.unwrap_or_default();
        serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("retry_after").and_then(serde_json::Value::as_f64))
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(self.config.default_retry_after)
    }

    async fn deliver<F>(&self, kind: &'static str, build: F) -> bool
    where
        F: Fn(&Client, &str) -> Result<RequestBuilder, reqwest::Error> + Send + Sync,
    {
        let Some(endpoint) = self.config.endpoint() else {
            debug!(kind, "webhook not configured; dropping notification");
            return false;
        };

        loop {
            self.wait_for_budget().await;

            let sent_at = Instant::now();
            let request = match build(&self.client, endpoint) {
                Ok(request) => request,
                Err(e) => {
                    warn!(kind, error = %e, "failed to build webhook request");
                    return false;
                }
            };
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(kind, error = %e, "webhook request failed");
                    return false;
                }
            };
            self.window().observe(response.headers(), sent_at);

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let delay = self.retry_delay(response).await;
                let retries = self.rate_limit_retries.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    kind,
                    delay_ms = delay.as_millis() as u64,
                    retries,
                    "rate limited by webhook; retrying"
                );
                sleep(delay).await;
                continue;
            }
            if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
                debug!(kind, %status, "webhook delivered");
                return true;
            }

            let body = response.text().await.unwrap_or_default();
            warn!(kind, %status, %body, "webhook rejected delivery");
            return false;
        }
    }
}

#[async_trait]
impl Notify for WebhookNotifier {
    async fn send_message(&self, text: &str) -> bool {
        let payload = MessagePayload {
            content: text,
            username: &self.config.username,
        };
        let timeout = self.config.message_timeout;

        self.deliver("message", |client, endpoint| {
            Ok(client.post(endpoint).timeout(timeout).json(&payload))
        })
        .await
    }

    async fn send_file(&self, file_name: &str, data: &[u8], caption: &str) -> bool {
        let username = self.config.username.as_str();
        let timeout = self.config.upload_timeout;

        // Each attempt rebuilds the form from the start of `data`.
        self.deliver("file", |client, endpoint| {
            let part = multipart::Part::bytes(data.to_vec())
                .file_name(file_name.to_string())
                .mime_str(ARCHIVE_MIME)?;
            let mut form = multipart::Form::new();
            if !caption.is_empty() {
                form = form.text("content", caption.to_string());
            }
            let form = form.text("username", username.to_string()).part("file", part);

            Ok(client.post(endpoint).timeout(timeout).multipart(form))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Arc;

    use axum::{
        Router,
        body::Bytes,
        extract::State,
        http::{HeaderMap, HeaderName, HeaderValue, StatusCode as AxumStatus},
        response::{IntoResponse, Response as AxumResponse},
        routing::post,
    };

    /// One canned webhook reply.
    #[derive(Clone)]
    struct Reply {
        status: u16,
        headers: Vec<(&'static str, &'static str)>,
        body: &'static str,
    }

    impl Reply {
        fn status(status: u16) -> Self {
            Self {
                status,
                headers: Vec::new(),
                body: "",
            }
        }

        fn header(mut self, name: &'static str, value: &'static str) -> Self {
            self.headers.push((name, value));
            self
        }

        fn body(mut self, body: &'static str) -> Self {
            self.body = body;
            self
        }
    }

    #[derive(Debug, Clone)]
    struct Seen {
        content_type: String,
        body: Vec<u8>,
    }

    #[derive(Default)]
    struct Script {
        replies: Mutex<VecDeque<Reply>>,
        seen: Mutex<Vec<Seen>>,
    }

    async fn hook(State(script): State<Arc<Script>>, headers: HeaderMap, body: Bytes) -> AxumResponse {
        script.seen.lock().unwrap().push(Seen {
            content_type: headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
            body: body.to_vec(),
        });
        let reply = script
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::status(204));

        let mut out = HeaderMap::new();
        for (k, v) in reply.headers {
            out.insert(HeaderName::from_static(k), HeaderValue::from_static(v));
        }
        let status = AxumStatus::from_u16(reply.status).unwrap();
        (status, out, reply.body).into_response()
    }

    async fn serve(replies: Vec<Reply>) -> (String, Arc<Script>) {
        let script = Arc::new(Script {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/hook", post(hook))
            .with_state(Arc::clone(&script));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/hook"), script)
    }

    fn notifier(endpoint: &str) -> WebhookNotifier {
        WebhookNotifier::new(WebhookConfig::with_endpoint(endpoint)).unwrap()
    }

    #[tokio::test]
    async fn unconfigured_endpoint_is_silent_noop() {
        let notifier = WebhookNotifier::new(WebhookConfig::default()).unwrap();
        assert!(!notifier.is_configured());
        assert!(!notifier.send_message("hello").await);
        assert!(!notifier.send_file("Results_Part1.zip", b"PK", "caption").await);
        assert_eq!(notifier.rate_limit_retries(), 0);
    }

    #[test]
    fn invalid_endpoint_is_rejected_at_construction() {
        let err = WebhookNotifier::new(WebhookConfig::with_endpoint("not a url")).err();
        assert!(matches!(err, Some(NotifyError::InvalidEndpoint(_))));
    }

    #[tokio::test]
    async fn message_posts_json_payload() {
        let (endpoint, script) = serve(vec![Reply::status(204)]).await;
        let notifier = notifier(&endpoint);

        assert!(notifier.send_message("🔴 Website went **DOWN**").await);

        let seen = script.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].content_type.starts_with("application/json"));
        let json: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
        assert_eq!(json["content"], "🔴 Website went **DOWN**");
        assert_eq!(json["username"], "BEU Monitor");
    }

    #[tokio::test]
    async fn rate_limited_message_is_retried_after_server_delay() {
        let (endpoint, script) = serve(vec![
            Reply::status(429).header("retry-after", "0.3"),
            Reply::status(200),
        ])
        .await;
        let notifier = notifier(&endpoint);

        let started = std::time::Instant::now();
        assert!(notifier.send_message("hello").await);

        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(notifier.rate_limit_retries(), 1);
        assert_eq!(script.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn retry_delay_falls_back_to_json_body() {
        let (endpoint, _script) = serve(vec![
            Reply::status(429).body(r#"{"message":"You are being rate limited.","retry_after":0.2}"#),
            Reply::status(204),
        ])
        .await;
        let notifier = notifier(&endpoint);

        let started = std::time::Instant::now();
        assert!(notifier.send_message("hello").await);
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(notifier.rate_limit_retries(), 1);
    }

    #[tokio::test]
    async fn other_failures_are_not_retried() {
        let (endpoint, script) = serve(vec![Reply::status(500).body("boom")]).await;
        let notifier = notifier(&endpoint);

        assert!(!notifier.send_message("hello").await);
        assert_eq!(script.seen.lock().unwrap().len(), 1);
        assert_eq!(notifier.rate_limit_retries(), 0);
    }

    #[tokio::test]
    async fn transport_error_returns_false() {
        let notifier = notifier("http://127.0.0.1:1/hook");
        assert!(!notifier.send_message("hello").await);
    }

    #[tokio::test]
    async fn spent_budget_delays_next_send() {
        let (endpoint, script) = serve(vec![
            Reply::status(204)
                .header("x-ratelimit-remaining", "0")
                .header("x-ratelimit-reset-after", "0.3"),
            Reply::status(204),
        ])
        .await;
        let notifier = notifier(&endpoint);

        assert!(notifier.send_message("first").await);
        assert_eq!(notifier.rate_limit_window().remaining(), 0);

        let started = std::time::Instant::now();
        assert!(notifier.send_message("second").await);
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(notifier.rate_limit_window().remaining(), 5);
        assert_eq!(script.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn file_upload_is_multipart_zip() {
        let (endpoint, script) = serve(vec![
            Reply::status(429).header("retry-after", "0.05"),
            Reply::status(200),
        ])
        .await;
        let notifier = notifier(&endpoint);

        let data = b"PK\x03\x04archive-bytes";
        assert!(
            notifier
                .send_file("Results_Part1.zip", data, "📦 **Batch 1 Ready** (0.00 MB)")
                .await
        );

        let seen = script.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        for request in &seen {
            assert!(request.content_type.starts_with("multipart/form-data"));
            let body = String::from_utf8_lossy(&request.body);
            assert!(body.contains(r#"name="file"; filename="Results_Part1.zip""#));
            assert!(body.contains("application/zip"));
            assert!(body.contains("archive-bytes"));
            assert!(body.contains(r#"name="username""#));
            assert!(body.contains("Batch 1 Ready"));
        }
    }

    #[tokio::test]
    async fn file_without_caption_omits_content_field() {
        let (endpoint, script) = serve(vec![Reply::status(200)]).await;
        let notifier = notifier(&endpoint);

        assert!(notifier.send_file("Results_Part2.zip", b"PK", "").await);
        let seen = script.seen.lock().unwrap().clone();
        let body = String::from_utf8_lossy(&seen[0].body);
        assert!(!body.contains(r#"name="content""#));
    }
}
