use std::sync::Arc;

use rollwatch_archive::ArchiveChunker;
use rollwatch_model::{LookupUrl, Roster};
use rollwatch_notify::Notify;
use rollwatch_render::{BatchFetcher, Prober, Renderer, Tab, TabKind};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::messages;
use crate::state::{MonitorState, Transition};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The site came up and the bulk pipeline ran.
    Delivered {
        downloaded: usize,
        total: usize,
        parts: usize,
    },
    /// The deadline passed without the site ever coming up.
    Expired { probes: usize },
}

/// Top-level controller of one monitoring run.
pub struct Monitor {
    config: MonitorConfig,
    roster: Roster,
    renderer: Arc<dyn Renderer>,
    notifier: Arc<dyn Notify>,
    prober: Prober,
    fetcher: BatchFetcher,
    chunker: ArchiveChunker,
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        roster: Roster,
        lookup: LookupUrl,
        renderer: Arc<dyn Renderer>,
        notifier: Arc<dyn Notify>,
    ) -> Self {
        let prober = Prober::new(&roster, &lookup, config.probe);
        let fetcher = BatchFetcher::new(Arc::clone(&renderer), lookup, config.fetch);
        let chunker = ArchiveChunker::new(config.archive, Arc::clone(&notifier));
        Self {
            config,
            roster,
            renderer,
            notifier,
            prober,
            fetcher,
            chunker,
        }
    }

    /// Run until the pipeline has delivered and the heartbeat phase ended, or
    /// until the run deadline passes.
    ///
    /// The probe tab is closed and the renderer shut down on every exit path.
    pub async fn run(&self) -> Result<RunOutcome, CoreError> {
        info!(
            roster = self.roster.len(),
            canary = %self.prober.canary(),
            run_secs = self.config.run_duration.as_secs(),
            "monitor started"
        );
        self.notify(&messages::started(self.chunker.config().budget_mib()))
            .await;

        let result = match self.renderer.open_tab(TabKind::Availability).await {
            Ok(mut tab) => {
                // The run window starts once the probe tab is ready.
                let deadline = Instant::now() + self.config.run_duration;
                let result = self.watch(tab.as_mut(), deadline).await;
                if let Err(e) = tab.close().await {
                    warn!(error = %e, "probe tab did not close cleanly");
                }
                result
            }
            Err(e) => Err(e.into()),
        };

        if let Err(e) = self.renderer.shutdown().await {
            warn!(error = %e, "renderer shutdown failed");
        }
        result
    }

    async fn watch(&self, tab: &mut dyn Tab, deadline: Instant) -> Result<RunOutcome, CoreError> {
        let mut state = MonitorState::new();
        let mut probes = 0;

        while Instant::now() < deadline {
            let status = self.prober.probe(tab).await;
            probes += 1;
            let transition = state.record(status, Instant::now(), self.config.down_reminder_delay);
            debug!(%status, ?transition, probes, "probe classified");

            match transition {
                Transition::WentLive => {
                    let outcome = self.deliver().await?;
                    self.heartbeat(deadline).await;
                    return Ok(outcome);
                }
                Transition::WentDown => self.notify(messages::WENT_DOWN).await,
                Transition::FirstDown => self.notify(messages::CURRENTLY_DOWN).await,
                Transition::DownReminder => self.notify(messages::STILL_DOWN).await,
                Transition::Unchanged => {}
            }
            sleep(self.config.check_interval).await;
        }

        info!(probes, "run deadline passed without the site coming up");
        Ok(RunOutcome::Expired { probes })
    }

    /// Fetch, pack and upload the whole roster.
    async fn deliver(&self) -> Result<RunOutcome, CoreError> {
        info!("site is live, starting bulk download");
        self.notify(messages::LIVE).await;

        let outcomes = self.fetcher.fetch_all(&self.roster).await;
        let total = outcomes.len();
        let downloaded = outcomes.iter().filter(|o| o.is_success()).count();
        self.notify(&messages::downloaded(downloaded)).await;

        let report = self.chunker.pack_and_upload(outcomes).await?;
        self.notify(messages::ALL_UPLOADED).await;

        Ok(RunOutcome::Delivered {
            downloaded,
            total,
            parts: report.parts,
        })
    }

    async fn heartbeat(&self, deadline: Instant) {
        loop {
            let left = deadline.saturating_duration_since(Instant::now()).as_secs();
            if left == 0 {
                break;
            }
            self.notify(&messages::still_up(left)).await;
            sleep(self.config.check_interval).await;
        }
    }

    async fn notify(&self, text: &str) {
        if !self.notifier.send_message(text).await {
            debug!(text, "message not delivered");
        }
    }
}
