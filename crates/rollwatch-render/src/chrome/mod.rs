//! Headless Chrome backend over the DevTools protocol.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{PdfLayout, Renderer, Tab, TabKind};
use crate::error::RenderError;

const VISIBLE_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    /// Browser binary; auto-detected when unset.
    pub executable: Option<PathBuf>,
    /// Presented by document tabs only; availability tabs keep the browser's own.
    pub user_agent: String,
    /// Disable only where the sandbox cannot work (containers running as root).
    pub sandbox: bool,
    pub launch_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            user_agent: "Mozilla/5.0".to_string(),
            sandbox: true,
            launch_timeout: Duration::from_secs(20),
        }
    }
}

/// One headless Chrome process shared by every tab.
pub struct ChromeRenderer {
    browser: RwLock<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    user_agent: String,
}

fn user_agent_for(kind: TabKind, configured: &str) -> Option<&str> {
    match kind {
        TabKind::Document => Some(configured),
        TabKind::Availability => None,
    }
}

impl ChromeRenderer {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder().launch_timeout(settings.launch_timeout);
        if let Some(path) = &settings.executable {
            builder = builder.chrome_executable(path);
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        let config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The handler drives the DevTools connection; the browser is inert without it.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "devtools handler event failed");
                }
            }
            debug!("devtools connection closed");
        });

        info!(sandbox = settings.sandbox, "headless browser launched");
        Ok(Self {
            browser: RwLock::new(Some(browser)),
            handler: Mutex::new(Some(handler)),
            user_agent: settings.user_agent.clone(),
        })
    }

    fn take_handler(&self) -> Option<JoinHandle<()>> {
        match self.handler.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn open_tab(&self, kind: TabKind) -> Result<Box<dyn Tab>, RenderError> {
        let guard = self.browser.read().await;
        let browser = guard.as_ref().ok_or(RenderError::Closed)?;
        let page = browser.new_page("about:blank").await?;
        if let Some(ua) = user_agent_for(kind, &self.user_agent) {
            if let Err(e) = page.execute(SetUserAgentOverrideParams::new(ua)).await {
                if let Err(close) = page.close().await {
                    debug!(error = %close, "tab close after failed user agent override");
                }
                return Err(e.into());
            }
        }
        Ok(Box::new(ChromeTab { page }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        let Some(mut browser) = self.browser.write().await.take() else {
            return Ok(());
        };

        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "browser process did not exit cleanly");
        }
        if let Some(handler) = self.take_handler() {
            handler.abort();
        }
        closed?;
        info!("headless browser closed");
        Ok(())
    }
}

struct ChromeTab {
    page: Page,
}

#[async_trait]
impl Tab for ChromeTab {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn visible_text(&mut self) -> Result<String, RenderError> {
        self.page
            .evaluate(VISIBLE_TEXT_JS)
            .await?
            .into_value::<String>()
            .map_err(|e| RenderError::Browser(e.to_string()))
    }

    async fn print_pdf(&mut self, layout: &PdfLayout) -> Result<Vec<u8>, RenderError> {
        let params = PrintToPdfParams {
            paper_width: Some(layout.paper_width_in),
            paper_height: Some(layout.paper_height_in),
            print_background: Some(layout.print_background),
            ..Default::default()
        };
        Ok(self.page.pdf(params).await?)
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        self.page.close().await?;
        Ok(())
    }
}
