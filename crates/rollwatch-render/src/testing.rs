//! Scripted [`Renderer`] for tests of probe and fetch consumers.
//!
//! Pages "render" their own URL as visible text, so a lookup for an
//! identifier shows that identifier unless the site is scripted otherwise.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::engine::{PdfLayout, Renderer, Tab, TabKind};
use crate::error::RenderError;

/// Shared script and instrumentation behind every tab of a [`ScriptedRenderer`].
#[derive(Debug, Default)]
pub struct ScriptedSite {
    down_navigations: AtomicUsize,
    always_down: AtomicBool,
    blank: AtomicBool,
    failing: Mutex<HashSet<String>>,
    navigation_delay: Mutex<Duration>,
    render_delay: Mutex<Duration>,
    document_size: AtomicUsize,
    open_delay: Mutex<Duration>,

    navigations: AtomicUsize,
    opened: AtomicUsize,
    availability_tabs: AtomicUsize,
    document_tabs: AtomicUsize,
    closed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    shut_down: AtomicBool,
}

impl ScriptedSite {
    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Tabs opened as [`TabKind::Availability`].
    pub fn availability_tabs(&self) -> usize {
        self.availability_tabs.load(Ordering::SeqCst)
    }

    /// Tabs opened as [`TabKind::Document`].
    pub fn document_tabs(&self) -> usize {
        self.document_tabs.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tabs currently open.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of tabs open at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn unreachable_now(&self) -> bool {
        if self.always_down.load(Ordering::SeqCst) {
            return true;
        }
        self.down_navigations
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn fails_for(&self, url: &str) -> bool {
        self.failing
            .lock()
            .unwrap()
            .iter()
            .any(|id| url.contains(&format!("regNo={id}&")))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedRenderer {
    site: Arc<ScriptedSite>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first `n` navigations (across all tabs) fail.
    pub fn down_for(self, n: usize) -> Self {
        self.site.down_navigations.store(n, Ordering::SeqCst);
        self
    }

    pub fn always_down(self) -> Self {
        self.site.always_down.store(true, Ordering::SeqCst);
        self
    }

    /// Pages load but show no text.
    pub fn blank_pages(self) -> Self {
        self.site.blank.store(true, Ordering::SeqCst);
        self
    }

    /// Navigations to the lookup page of `id` fail.
    pub fn fail_identifier(self, id: &str) -> Self {
        self.site.failing.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn navigation_delay(self, delay: Duration) -> Self {
        *self.site.navigation_delay.lock().unwrap() = delay;
        self
    }

    /// Time each PDF print takes.
    pub fn render_delay(self, delay: Duration) -> Self {
        *self.site.render_delay.lock().unwrap() = delay;
        self
    }

    /// Print documents of exactly `bytes` incompressible bytes instead of a
    /// short marker document.
    pub fn document_size(self, bytes: usize) -> Self {
        self.site.document_size.store(bytes, Ordering::SeqCst);
        self
    }

    /// Time each tab takes to open.
    pub fn open_delay(self, delay: Duration) -> Self {
        *self.site.open_delay.lock().unwrap() = delay;
        self
    }

    pub fn site(&self) -> Arc<ScriptedSite> {
        Arc::clone(&self.site)
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn open_tab(&self, kind: TabKind) -> Result<Box<dyn Tab>, RenderError> {
        if self.site.is_shut_down() {
            return Err(RenderError::Closed);
        }
        let delay = *self.site.open_delay.lock().unwrap();
        if !delay.is_zero() {
            sleep(delay).await;
        }
        self.site.opened.fetch_add(1, Ordering::SeqCst);
        match kind {
            TabKind::Availability => self.site.availability_tabs.fetch_add(1, Ordering::SeqCst),
            TabKind::Document => self.site.document_tabs.fetch_add(1, Ordering::SeqCst),
        };
        let now = self.site.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.site.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(ScriptedTab {
            site: Arc::clone(&self.site),
            url: None,
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        self.site.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct ScriptedTab {
    site: Arc<ScriptedSite>,
    url: Option<String>,
}

#[async_trait]
impl Tab for ScriptedTab {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.site.navigations.fetch_add(1, Ordering::SeqCst);
        let delay = *self.site.navigation_delay.lock().unwrap();
        if !delay.is_zero() {
            sleep(delay).await;
        }
        if self.site.unreachable_now() || self.site.fails_for(url) {
            self.url = None;
            return Err(RenderError::Browser(format!("net::ERR_CONNECTION_REFUSED at {url}")));
        }
        self.url = Some(url.to_string());
        Ok(())
    }

    async fn visible_text(&mut self) -> Result<String, RenderError> {
        if self.site.blank.load(Ordering::SeqCst) {
            return Ok(String::new());
        }
        Ok(self.url.clone().unwrap_or_default())
    }

    async fn print_pdf(&mut self, _layout: &PdfLayout) -> Result<Vec<u8>, RenderError> {
        let url = self
            .url
            .clone()
            .ok_or_else(|| RenderError::Browser("nothing loaded".into()))?;
        let delay = *self.site.render_delay.lock().unwrap();
        if !delay.is_zero() {
            sleep(delay).await;
        }
        match self.site.document_size.load(Ordering::SeqCst) {
            0 => Ok([b"%PDF-1.4\n".as_slice(), url.as_bytes()].concat()),
            size => Ok(noise(&url, size)),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        self.site.closed.fetch_add(1, Ordering::SeqCst);
        self.site.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Deterministic incompressible bytes seeded from `seed` (xorshift64).
fn noise(seed: &str, len: usize) -> Vec<u8> {
    let mut state = seed
        .bytes()
        .fold(0x9E37_79B9_7F4A_7C15_u64, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01B3)
        })
        | 1;
    let mut out = Vec::with_capacity(len + 8);
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.extend_from_slice(&state.to_le_bytes());
    }
    out.truncate(len);
    out
}
