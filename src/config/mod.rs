//! Configuration for the metrics side of the adapter.
//!
//! ```yaml
//! metrics:
//!   enabled: true
//!   address: "0.0.0.0:9090"
//!   namespace: racecar
//!   tags:
//!     - env:${ENVIRONMENT:-dev}
//! ```

mod vars;

pub use vars::{InterpolationResult, interpolate};

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{
    ConfigError, EnvInterpolationSnafu, InvalidAddressSnafu, InvalidTagSnafu, ReadFileSnafu,
    ReservedTagKeySnafu, YamlParseSnafu,
};

/// Tag keys the subscribers attach to emissions; default tags may not reuse them.
pub const RESERVED_TAG_KEYS: &[&str] = &["client", "group_id", "topic", "partition"];

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load, interpolate, parse and validate a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).context(ReadFileSnafu)?;
        Self::from_yaml(&contents)
    }

    /// Interpolate, parse and validate a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let result = interpolate(contents);
        ensure!(
            result.is_ok(),
            EnvInterpolationSnafu {
                message: result.errors.join("\n")
            }
        );

        let config: Config = serde_yaml::from_str(&result.text).context(YamlParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.metrics.validate()
    }
}

/// Metrics sink and exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// Whether the Prometheus exporter is started (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    /// Address to bind the exporter HTTP server (default: "0.0.0.0:9090").
    #[serde(default = "default_metrics_address")]
    pub address: String,
    /// Prefix for every metric name, joined with a `.`.
    #[serde(default)]
    pub namespace: Option<String>,
    /// `key:value` tags attached to every emission.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            address: default_metrics_address(),
            namespace: None,
            tags: Vec::new(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_address() -> String {
    "0.0.0.0:9090".to_string()
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for tag in &self.tags {
            let key = match tag.split_once(':') {
                Some((key, _)) if !key.is_empty() => key,
                _ => return InvalidTagSnafu { tag: tag.as_str() }.fail(),
            };
            ensure!(
                !RESERVED_TAG_KEYS.contains(&key),
                ReservedTagKeySnafu { tag: tag.as_str(), key }
            );
        }

        if self.enabled {
            self.socket_addr()?;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address.parse().context(InvalidAddressSnafu {
            address: self.address.as_str(),
        })
    }
}
