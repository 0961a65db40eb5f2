//! Monitor Controller: probes the result site on an interval, reports
//! availability changes, and runs the bulk download pipeline once the site
//! comes up.

pub mod error;
pub use error::CoreError;

mod config;
pub use config::MonitorConfig;

pub mod messages;

mod state;
pub use state::{MonitorState, Transition};

mod monitor;
pub use monitor::{Monitor, RunOutcome};
