#![forbid(unsafe_code)]

//! Structured logging glue.
//!
//! With the `tracing` feature the crate emits spans and events through the
//! `tracing` facade; the macros are re-exported here so dependants do not
//! need a direct dependency. With `tracing-json` a subscriber can be
//! installed from this module, filtered by `RUST_LOG`.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Output format for [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// A global subscriber could not be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingInitError(pub String);

impl std::fmt::Display for LoggingInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to install log subscriber: {}", self.0)
    }
}

impl std::error::Error for LoggingInitError {}

/// Install a global subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_filter` when set and valid.
#[cfg(feature = "tracing-json")]
pub fn init(format: LogFormat, default_filter: &str) -> Result<(), LoggingInitError> {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| LoggingInitError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_is_pretty() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    #[test]
    fn init_error_display() {
        let err = LoggingInitError("already set".into());
        assert_eq!(
            err.to_string(),
            "failed to install log subscriber: already set"
        );
    }
}
