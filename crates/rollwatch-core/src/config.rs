use std::time::Duration;

use rollwatch_archive::ChunkerConfig;
use rollwatch_render::{FetchSettings, ProbeSettings};

/// Controller timing plus the settings of the components it drives.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Pause between probes, and between heartbeats once the site is up.
    pub check_interval: Duration,
    /// Total lifetime of a run, measured from its start.
    pub run_duration: Duration,
    /// Minimum gap between two DOWN alerts while the site stays down.
    pub down_reminder_delay: Duration,
    pub probe: ProbeSettings,
    pub fetch: FetchSettings,
    pub archive: ChunkerConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(5),
            run_duration: Duration::from_secs(900),
            down_reminder_delay: Duration::from_secs(600),
            probe: ProbeSettings::default(),
            fetch: FetchSettings::default(),
            archive: ChunkerConfig::default(),
        }
    }
}
