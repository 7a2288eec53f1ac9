//! Error types using snafu.
//!
//! Event dispatch itself never fails: payloads are typed, and sink failures
//! are absorbed by the sink. The errors here cover the edges of the crate,
//! namely configuration loading, exporter installation and parsing event
//! names that arrive as strings.

use snafu::prelude::*;

// ============ Config Errors ============

/// Errors that can occur during configuration parsing and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[snafu(display("Failed to read configuration file"))]
    ReadFile { source: std::io::Error },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML configuration"))]
    YamlParse { source: serde_yaml::Error },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// A default tag is not of the form `key:value`.
    #[snafu(display("Invalid tag '{tag}': expected key:value with a non-empty key"))]
    InvalidTag { tag: String },

    /// A default tag uses a key that events set themselves.
    #[snafu(display("Default tag '{tag}' uses reserved key '{key}'"))]
    ReservedTagKey { tag: String, key: String },

    /// The exporter address is not a socket address.
    #[snafu(display("Invalid metrics address '{address}'"))]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },
}

// ============ Metrics Errors ============

/// Errors that can occur during exporter initialization.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MetricsError {
    /// Failed to initialize Prometheus recorder.
    #[snafu(display("Failed to initialize Prometheus recorder"))]
    PrometheusInit {
        source: metrics_exporter_prometheus::BuildError,
    },

    /// The exporter was already installed in this process.
    #[snafu(display("Metrics exporter already initialized"))]
    AlreadyInitialized,

    /// The exporter has not been installed yet.
    #[snafu(display("Metrics exporter not initialized"))]
    NotInitialized,
}

// ============ Event Errors ============

/// Errors raised at the string boundary of the event model.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum EventError {
    /// The name does not match any instrumented lifecycle event.
    #[snafu(display("Unknown event name '{name}'"))]
    UnknownEventName { name: String },
}
