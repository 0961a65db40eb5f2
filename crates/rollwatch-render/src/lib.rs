//! Headless-browser side of the monitor.
//!
//! - [`Renderer`] / [`Tab`]: the rendering-engine boundary (Chrome via CDP behind the `chrome` feature).
//! - [`Prober`]: one canary lookup, classified UP or DOWN.
//! - [`BatchFetcher`]: one PDF per roster entry with a fixed number of concurrent renders.

mod error;
pub use error::RenderError;

mod engine;
pub use engine::{PdfLayout, Renderer, Tab, TabKind, navigate_within, wait_for_text};

mod probe;
pub use probe::{ProbeSettings, Prober};

mod fetch;
pub use fetch::{BatchFetcher, FetchSettings};

#[cfg(feature = "chrome")]
mod chrome;
#[cfg(feature = "chrome")]
pub use chrome::{BrowserSettings, ChromeRenderer};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
