use time::UtcOffset;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::fmt::{self, time::OffsetTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::config::LoggerConfig;
use crate::error::LoggerError;
use crate::format::LoggerFormat;

type OutputLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInstalled`] when a subscriber is already set.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = cfg.env_filter()?;
    let output = output_layer(cfg)?;

    tracing_subscriber::registry()
        .with(output.with_filter(filter))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInstalled)
}

fn output_layer(cfg: &LoggerConfig) -> Result<OutputLayer, LoggerError> {
    let layer: OutputLayer = match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(local_timer())
            .boxed(),
        LoggerFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_ansi(false)
            .with_target(cfg.with_targets)
            .with_timer(local_timer())
            .boxed(),
        LoggerFormat::Journald => journald_layer()?,
    };
    Ok(layer)
}

// UTC when the local offset is unknown, which is the case once threads exist on unix.
fn local_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_layer() -> Result<OutputLayer, LoggerError> {
    tracing_journald::layer()
        .map(|layer| layer.boxed())
        .map_err(|e| LoggerError::Journald(e.to_string()))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_layer() -> Result<OutputLayer, LoggerError> {
    Err(LoggerError::JournaldUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_json_outputs_build() {
        for format in [LoggerFormat::Text, LoggerFormat::Json] {
            let cfg = LoggerConfig {
                format,
                ..LoggerConfig::default()
            };
            assert!(output_layer(&cfg).is_ok());
        }
    }

    #[test]
    fn second_install_is_rejected() {
        let cfg = LoggerConfig::default();
        // Another test in this binary may have installed first; either way
        // the later call must fail.
        let _ = logger_init(&cfg);
        assert!(matches!(logger_init(&cfg), Err(LoggerError::AlreadyInstalled)));
    }
}
