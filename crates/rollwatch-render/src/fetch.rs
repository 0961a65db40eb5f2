use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use rollwatch_model::{FetchOutcome, Identifier, LookupUrl, Roster};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::engine::{PdfLayout, Renderer, Tab, TabKind, navigate_within, wait_for_text};
use crate::error::RenderError;

/// Bulk render settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchSettings {
    /// Maximum number of renders in flight at once.
    pub concurrency: usize,
    pub navigation_timeout: Duration,
    /// Best-effort wait for the identifier to appear before printing.
    pub ready_timeout: Duration,
    pub layout: PdfLayout,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            concurrency: 6,
            navigation_timeout: Duration::from_secs(40),
            ready_timeout: Duration::from_secs(10),
            layout: PdfLayout::A4,
        }
    }
}

/// Renders one document per roster entry on a fixed-size worker pool.
///
/// Every roster entry yields exactly one [`FetchOutcome`]; outcome order is
/// unspecified. A failed render becomes an outcome without a document and
/// never aborts the batch.
#[derive(Clone)]
pub struct BatchFetcher {
    job: RenderJob,
}

#[derive(Clone)]
struct RenderJob {
    renderer: Arc<dyn Renderer>,
    lookup: Arc<LookupUrl>,
    settings: FetchSettings,
}

impl BatchFetcher {
    pub fn new(renderer: Arc<dyn Renderer>, lookup: LookupUrl, settings: FetchSettings) -> Self {
        Self {
            job: RenderJob {
                renderer,
                lookup: Arc::new(lookup),
                settings,
            },
        }
    }

    pub async fn fetch_all(&self, roster: &Roster) -> Vec<FetchOutcome> {
        let queue: Arc<Mutex<VecDeque<Identifier>>> =
            Arc::new(Mutex::new(roster.iter().cloned().collect()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let workers = self.job.settings.concurrency.max(1).min(roster.len());
        info!(total = roster.len(), workers, "bulk render started");

        let mut pool = JoinSet::new();
        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let job = self.job.clone();
            pool.spawn(async move {
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(id) = next else {
                        break;
                    };
                    if tx.send(job.render(id).await).is_err() {
                        break;
                    }
                }
                debug!(worker, "fetch worker drained");
            });
        }
        drop(tx);

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "fetch worker terminated abnormally");
            }
        }

        let mut outcomes = Vec::with_capacity(roster.len());
        while let Ok(outcome) = rx.try_recv() {
            outcomes.push(outcome);
        }
        let outcomes = fill_missing(roster, outcomes);

        let rendered = outcomes.iter().filter(|o| o.is_success()).count();
        info!(rendered, total = outcomes.len(), "bulk render finished");
        outcomes
    }
}

impl RenderJob {
    async fn render(&self, id: Identifier) -> FetchOutcome {
        let mut tab = match self.renderer.open_tab(TabKind::Document).await {
            Ok(tab) => tab,
            Err(e) => {
                warn!(identifier = %id, error = %e, "could not open tab");
                return FetchOutcome::failed(id);
            }
        };

        let result = self.snapshot(tab.as_mut(), &id).await;
        if let Err(e) = tab.close().await {
            debug!(identifier = %id, error = %e, "tab close failed");
        }

        match result {
            Ok(document) => {
                debug!(identifier = %id, bytes = document.len(), "document rendered");
                FetchOutcome::success(id, document)
            }
            Err(e) => {
                warn!(identifier = %id, error = %e, "render failed");
                FetchOutcome::failed(id)
            }
        }
    }

    async fn snapshot(&self, tab: &mut dyn Tab, id: &Identifier) -> Result<Vec<u8>, RenderError> {
        let url = self.lookup.for_identifier(id);
        navigate_within(tab, url.as_str(), self.settings.navigation_timeout).await?;

        if let Err(e) = wait_for_text(tab, id.as_str(), self.settings.ready_timeout).await {
            debug!(identifier = %id, error = %e, "identifier not visible, printing anyway");
        }
        tab.print_pdf(&self.settings.layout).await
    }
}

/// Add a failed outcome for every roster entry the pool did not report.
fn fill_missing(roster: &Roster, mut outcomes: Vec<FetchOutcome>) -> Vec<FetchOutcome> {
    let mut reported: HashMap<&Identifier, usize> = HashMap::new();
    for outcome in &outcomes {
        *reported.entry(&outcome.identifier).or_default() += 1;
    }

    let mut missing = Vec::new();
    for id in roster {
        match reported.get_mut(id) {
            Some(n) if *n > 0 => *n -= 1,
            _ => missing.push(id.clone()),
        }
    }

    if !missing.is_empty() {
        warn!(count = missing.len(), "renders lost without an outcome");
        outcomes.extend(missing.into_iter().map(FetchOutcome::failed));
    }
    outcomes
}
