use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::trace;

use crate::error::RenderError;

/// Interval between visible-text checks while waiting for content.
const TEXT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Page geometry for document snapshots, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfLayout {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    pub print_background: bool,
}

impl PdfLayout {
    /// ISO A4 with background graphics.
    pub const A4: Self = Self {
        paper_width_in: 8.27,
        paper_height_in: 11.69,
        print_background: true,
    };
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self::A4
    }
}

/// One isolated browser tab.
///
/// Callers own the tab and must hand it back through [`Tab::close`] on every
/// exit path.
#[async_trait]
pub trait Tab: Send {
    /// Load `url` and resolve once the page has finished loading.
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Rendered text of the current page (`document.body.innerText`).
    async fn visible_text(&mut self) -> Result<String, RenderError>;

    /// Snapshot the current page as a PDF document.
    async fn print_pdf(&mut self, layout: &PdfLayout) -> Result<Vec<u8>, RenderError>;

    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}

/// What a tab will be used for.
///
/// Availability checks browse with the engine's stock identity; document
/// fetches present the configured user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKind {
    Availability,
    Document,
}

/// Rendering engine able to hand out fresh tabs.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn open_tab(&self, kind: TabKind) -> Result<Box<dyn Tab>, RenderError>;

    /// Tear the engine down. Tabs opened afterwards fail with [`RenderError::Closed`].
    async fn shutdown(&self) -> Result<(), RenderError>;
}

/// Navigate with an upper bound on the whole load.
pub async fn navigate_within(
    tab: &mut dyn Tab,
    url: &str,
    limit: Duration,
) -> Result<(), RenderError> {
    timeout(limit, tab.navigate(url))
        .await
        .map_err(|_| RenderError::Timeout {
            op: "navigation",
            after: limit,
        })?
}

/// Poll the page's visible text until it contains `needle`.
///
/// Read errors count as "not yet" (the page may still be settling); only the
/// deadline ends the wait unsuccessfully.
pub async fn wait_for_text(
    tab: &mut dyn Tab,
    needle: &str,
    limit: Duration,
) -> Result<(), RenderError> {
    let poll = async {
        loop {
            match tab.visible_text().await {
                Ok(text) if text.contains(needle) => return,
                Ok(_) => {}
                Err(e) => trace!(error = %e, "visible text not readable yet"),
            }
            sleep(TEXT_POLL_INTERVAL).await;
        }
    };
    timeout(limit, poll).await.map_err(|_| RenderError::Timeout {
        op: "text wait",
        after: limit,
    })
}
