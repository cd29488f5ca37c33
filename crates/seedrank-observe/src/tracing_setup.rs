//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! use seedrank_observe::tracing_setup::{init_tracing, LogFormat};
//!
//! // Human-readable logs at warn level unless RUST_LOG says otherwise
//! init_tracing(LogFormat::Text, "warn", false).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::sync::OnceLock;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Build the level filter: `RUST_LOG` when set, otherwise `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Build the `fmt` layer writing to `writer`.
///
/// [`init_tracing`] passes stderr; stdout is reserved for command output.
pub fn fmt_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    }
}

/// Initialize the global tracing subscriber.
///
/// - Installs a `fmt` layer (text or JSON) on stderr that also reports span close
///   timing, so `recommend` and similarity scans show their latency.
/// - When `enable_otel` is true, additionally bridges spans to OpenTelemetry
///   using a stdout exporter (spans then share stdout with command output).
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set.
pub fn init_tracing(
    format: LogFormat,
    default_directive: &str,
    enable_otel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = env_filter(default_directive);

    let fmt = fmt_layer(format, std::io::stderr);

    let otel_layer = if enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("seedrank");

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Safe to call even when OTel was not enabled (no-op in that case).
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_env_filter_uses_default_directive() {
        // SAFETY: single-threaded access in this test; no other test reads RUST_LOG.
        unsafe { std::env::remove_var("RUST_LOG") };
        let filter = env_filter("warn");
        assert_eq!(filter.to_string(), "warn");
    }

    /// Shared in-memory sink standing in for stderr.
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

    impl<'w> MakeWriter<'w> for Capture {
        type Writer = Capture;

        fn make_writer(&'w self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_fmt_layer_writes_to_given_writer() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("warn"))
            .with(fmt_layer(LogFormat::Json, capture.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(skipped = 2, "scan skipped rows");
            tracing::info!("filtered out");
        });

        let text = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["fields"]["message"], "scan skipped rows");
    }

    #[test]
    fn test_shutdown_without_init_is_noop() {
        shutdown_tracing();
    }
}
