//! Observability setup for seedrank: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
