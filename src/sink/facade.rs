//! Sink backed by the `metrics` crate facade.
//!
//! Whatever recorder the process installed (the Prometheus exporter in
//! [`crate::exporter`], or none at all) receives the emissions. Without a
//! recorder every call is a no-op.
//!
//! `key:value` tags become labels. Timings are recorded as histograms in
//! milliseconds, counts as monotonic counters named `<name>.total` so they
//! never share a series with a histogram's `_sum`/`_count` lines.

use metrics::{Label, counter, gauge, histogram};
use tracing::warn;

use super::MetricsSink;
use crate::config::MetricsConfig;
use crate::tags::TagSet;

/// Forwards sink calls to the globally installed `metrics` recorder.
#[derive(Debug, Clone, Default)]
pub struct FacadeSink {
    /// Prefix joined to every metric name with a `.`.
    namespace: Option<String>,
    /// Labels appended after the event's own tags.
    default_labels: Vec<Label>,
}

impl FacadeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MetricsConfig) -> Self {
        Self::new()
            .with_namespace(config.namespace.clone())
            .with_default_tags(&config.tags)
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    /// Add `key:value` strings that are attached to every emission.
    pub fn with_default_tags(mut self, tags: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.default_labels
            .extend(tags.into_iter().map(|tag| parse_label(tag.as_ref())));
        self
    }

    fn metric_name(&self, name: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}.{name}"),
            None => name.to_string(),
        }
    }

    fn counter_name(&self, name: &str) -> String {
        format!("{}.total", self.metric_name(name))
    }

    /// Event tags first, then defaults whose key the event didn't set.
    fn labels(&self, tags: &TagSet) -> Vec<Label> {
        tags.iter()
            .map(|tag| Label::new(tag.key().to_string(), tag.value().to_string()))
            .chain(
                self.default_labels
                    .iter()
                    .filter(|label| !tags.has_key(label.key()))
                    .cloned(),
            )
            .collect()
    }
}

/// Split a `key:value` string on its first `:`.
fn parse_label(tag: &str) -> Label {
    match tag.split_once(':') {
        Some((key, value)) => Label::new(key.to_string(), value.to_string()),
        None => Label::new(tag.to_string(), String::new()),
    }
}

impl MetricsSink for FacadeSink {
    fn increment(&self, name: &str, tags: &TagSet) {
        counter!(self.counter_name(name), self.labels(tags)).increment(1);
    }

    fn count(&self, name: &str, value: i64, tags: &TagSet) {
        match u64::try_from(value) {
            Ok(value) => counter!(self.counter_name(name), self.labels(tags)).increment(value),
            Err(_) => warn!(metric = name, value, "Dropping negative count"),
        }
    }

    fn gauge(&self, name: &str, value: f64, tags: &TagSet) {
        gauge!(self.metric_name(name), self.labels(tags)).set(value);
    }

    fn histogram(&self, name: &str, value: f64, tags: &TagSet) {
        histogram!(self.metric_name(name), self.labels(tags)).record(value);
    }

    fn timing(&self, name: &str, duration_ms: f64, tags: &TagSet) {
        histogram!(self.metric_name(name), self.labels(tags)).record(duration_ms);
    }
}
