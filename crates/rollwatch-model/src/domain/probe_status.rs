use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a single availability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeStatus {
    /// Lookup page loaded and showed the canary's text.
    Up,
    /// Anything else: timeout, navigation error, or missing text.
    Down,
}

impl ProbeStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, ProbeStatus::Up)
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Up => f.write_str("UP"),
            ProbeStatus::Down => f.write_str("DOWN"),
        }
    }
}
