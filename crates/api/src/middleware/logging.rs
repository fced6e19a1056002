//! Logging initialization and configuration.

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Output format selected by `logging.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    Json,
    /// Single-line text.
    Compact,
    /// Multi-line text for local development.
    Pretty,
}

impl LogFormat {
    /// Unknown values fall back to `Pretty`.
    pub fn from_config(format: &str) -> Self {
        match format.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Builds the filter: `RUST_LOG` wins, otherwise the configured level.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Subscriber writing events in `format` to `writer`.
pub fn build_subscriber<W>(
    format: LogFormat,
    filter: EnvFilter,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => Box::new(
            registry.with(
                fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Compact => Box::new(
            registry.with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Pretty => Box::new(
            registry.with(
                fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_writer(writer),
            ),
        ),
    }
}

/// Installs the global subscriber, writing to stdout.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    build_subscriber(
        LogFormat::from_config(&config.format),
        env_filter(config),
        std::io::stdout,
    )
    .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn emit(format: LogFormat) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = build_subscriber(format, EnvFilter::new("info"), move || writer.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(pin = "V3", "Device switched");
            tracing::debug!("filtered out");
        });
        capture.text()
    }

    #[test]
    fn test_format_from_config() {
        assert_eq!(LogFormat::from_config("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_config("Compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from_config("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_config("colourful"), LogFormat::Pretty);
    }

    #[test]
    fn test_json_format_emits_one_object_per_event() {
        let output = emit(LogFormat::Json);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);

        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["fields"]["message"], "Device switched");
        assert_eq!(event["fields"]["pin"], "V3");
        assert_eq!(event["level"], "INFO");
    }

    #[test]
    fn test_compact_format_is_single_line() {
        let output = emit(LogFormat::Compact);
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("Device switched"));
        assert!(!output.contains("filtered out"));
        assert!(!output.contains("syncora_api::middleware::logging"));
    }

    #[test]
    fn test_pretty_format_spans_lines() {
        let output = emit(LogFormat::Pretty);
        assert!(output.contains("Device switched"));
        assert!(output.lines().count() > 1);
    }
}
