use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use rollwatch_core::{Monitor, RunOutcome};
use rollwatch_model::LookupUrl;
use rollwatch_notify::WebhookNotifier;
use rollwatch_observe::logger_init;
use rollwatch_render::ChromeRenderer;

mod config;
mod roster;

use config::AgentConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Configuration + logger
    let cfg = AgentConfig::from_env()?;
    logger_init(&cfg.logger)?;
    info!(format = %cfg.logger.format, filter = %cfg.logger.filter, "logger initialized");

    // 2) Roster and lookup URLs
    let roster = roster::load(cfg.roster_file.as_deref())?;
    let lookup = LookupUrl::new(&cfg.lookup_base, cfg.exam.clone())
        .with_context(|| format!("lookup base {}", cfg.lookup_base))?;
    info!(entries = roster.len(), canary = %roster.canary(), "roster loaded");

    // 3) Notifier
    let notifier = WebhookNotifier::new(cfg.webhook.clone()).context("webhook notifier")?;
    if !notifier.is_configured() {
        info!("no webhook configured, notifications are disabled");
    }

    // 4) Browser
    let renderer = ChromeRenderer::launch(&cfg.browser)
        .await
        .context("launching headless browser")?;

    // 5) Run
    let monitor = Monitor::new(
        cfg.monitor.clone(),
        roster,
        lookup,
        Arc::new(renderer),
        Arc::new(notifier),
    );
    match monitor.run().await {
        Ok(RunOutcome::Delivered {
            downloaded,
            total,
            parts,
        }) => info!(downloaded, total, parts, "results delivered"),
        Ok(RunOutcome::Expired { probes }) => info!(probes, "run ended, site never came up"),
        Err(e) => {
            error!(error = %e, "monitor aborted");
            return Err(e.into());
        }
    }
    Ok(())
}
