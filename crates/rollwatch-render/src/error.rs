use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("browser error: {0}")]
    Browser(String),
    #[error("{op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },
    #[error("browser already shut down")]
    Closed,
}

#[cfg(feature = "chrome")]
impl From<chromiumoxide::error::CdpError> for RenderError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        RenderError::Browser(e.to_string())
    }
}
