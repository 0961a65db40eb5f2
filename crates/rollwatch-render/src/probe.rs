use std::time::Duration;

use rollwatch_model::{Identifier, LookupUrl, ProbeStatus, Roster};
use tracing::debug;

use crate::engine::{Tab, navigate_within, wait_for_text};
use crate::error::RenderError;

/// Timeouts for one availability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Upper bound on loading the canary lookup page.
    pub navigation_timeout: Duration,
    /// Upper bound on the canary identifier showing up once the page loaded.
    pub text_timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(15),
            text_timeout: Duration::from_secs(5),
        }
    }
}

/// Classifies the result site as UP or DOWN from a single canary lookup.
#[derive(Debug, Clone)]
pub struct Prober {
    canary: Identifier,
    url: String,
    settings: ProbeSettings,
}

impl Prober {
    /// The canary is the first roster entry.
    pub fn new(roster: &Roster, lookup: &LookupUrl, settings: ProbeSettings) -> Self {
        let canary = roster.canary().clone();
        let url = lookup.for_identifier(&canary).to_string();
        Self {
            canary,
            url,
            settings,
        }
    }

    pub fn canary(&self) -> &Identifier {
        &self.canary
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// UP iff the page loads and shows the canary identifier in time.
    /// Every failure, including a loaded page without the text, is DOWN.
    pub async fn probe(&self, tab: &mut dyn Tab) -> ProbeStatus {
        match self.check(tab).await {
            Ok(()) => ProbeStatus::Up,
            Err(e) => {
                debug!(canary = %self.canary, error = %e, "probe failed");
                ProbeStatus::Down
            }
        }
    }

    async fn check(&self, tab: &mut dyn Tab) -> Result<(), RenderError> {
        navigate_within(tab, &self.url, self.settings.navigation_timeout).await?;
        wait_for_text(tab, self.canary.as_str(), self.settings.text_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Renderer, TabKind};
    use crate::testing::ScriptedRenderer;
    use rollwatch_model::{DEFAULT_LOOKUP_BASE, ExamConfig};

    fn prober(ids: &[&str]) -> Prober {
        let roster = Roster::new(ids.iter().map(|s| Identifier::from(*s)).collect()).unwrap();
        let lookup = LookupUrl::new(DEFAULT_LOOKUP_BASE, ExamConfig::default()).unwrap();
        Prober::new(&roster, &lookup, ProbeSettings::default())
    }

    #[test]
    fn canary_is_first_roster_entry() {
        let p = prober(&["22156148040", "22156148041"]);
        assert_eq!(p.canary().as_str(), "22156148040");
        assert!(p.url().contains("regNo=22156148040"));
    }

    #[tokio::test(start_paused = true)]
    async fn reachable_site_is_up() {
        let renderer = ScriptedRenderer::new();
        let mut tab = renderer.open_tab(TabKind::Availability).await.unwrap();
        assert_eq!(prober(&["1001"]).probe(tab.as_mut()).await, ProbeStatus::Up);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_navigation_is_down() {
        let renderer = ScriptedRenderer::new().down_for(1);
        let mut tab = renderer.open_tab(TabKind::Availability).await.unwrap();
        let p = prober(&["1001"]);

        assert_eq!(p.probe(tab.as_mut()).await, ProbeStatus::Down);
        assert_eq!(p.probe(tab.as_mut()).await, ProbeStatus::Up);
    }

    #[tokio::test(start_paused = true)]
    async fn loaded_page_without_canary_is_down() {
        let renderer = ScriptedRenderer::new().blank_pages();
        let mut tab = renderer.open_tab(TabKind::Availability).await.unwrap();
        assert_eq!(prober(&["1001"]).probe(tab.as_mut()).await, ProbeStatus::Down);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_navigation_is_down() {
        let renderer = ScriptedRenderer::new().navigation_delay(Duration::from_secs(60));
        let mut tab = renderer.open_tab(TabKind::Availability).await.unwrap();
        assert_eq!(prober(&["1001"]).probe(tab.as_mut()).await, ProbeStatus::Down);
    }
}
