//! Destinations for metric emissions.
//!
//! Subscribers talk to a [`MetricsSink`] and nothing else. Every call is
//! fire-and-forget: a sink that fails to ship a metric logs or drops it,
//! it never reports back to the event handler.
//!
//! - `facade`: forwards into the `metrics` crate recorder
//! - `recording`: keeps emissions in memory, for tests and debugging

pub mod facade;
pub mod recording;

pub use facade::FacadeSink;
pub use recording::RecordingSink;

use std::fmt;

use crate::tags::TagSet;

/// Capability set of a statsd-style metrics client.
pub trait MetricsSink: Send + Sync {
    /// Increment a counter by exactly one.
    fn increment(&self, name: &str, tags: &TagSet);

    /// Add `value` to a counter.
    fn count(&self, name: &str, value: i64, tags: &TagSet);

    /// Set a gauge.
    fn gauge(&self, name: &str, value: f64, tags: &TagSet);

    /// Record a histogram sample.
    fn histogram(&self, name: &str, value: f64, tags: &TagSet);

    /// Record a duration in milliseconds.
    fn timing(&self, name: &str, duration_ms: f64, tags: &TagSet);
}

/// Kind of a sink call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Increment,
    Count,
    Gauge,
    Histogram,
    Timing,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Increment => "increment",
            MetricKind::Count => "count",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Timing => "timing",
        }
    }
}

/// One call that crossed the sink boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEmission {
    pub kind: MetricKind,
    pub name: String,
    /// `None` for increments.
    pub value: Option<f64>,
    pub tags: Vec<String>,
}

impl MetricEmission {
    pub fn new(kind: MetricKind, name: &str, value: Option<f64>, tags: &TagSet) -> Self {
        Self {
            kind,
            name: name.to_string(),
            value,
            tags: tags.to_strings(),
        }
    }
}

impl fmt::Display for MetricEmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}", self.kind.as_str(), self.name)?;
        if let Some(value) = self.value {
            write!(f, ", {value}")?;
        }
        write!(f, ", tags: [{}])", self.tags.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::client_only;

    #[test]
    fn test_emission_display() {
        let tags = client_only("racecar");
        let emission = MetricEmission::new(MetricKind::Count, "producer.deliver.messages", Some(10.0), &tags);
        assert_eq!(
            emission.to_string(),
            "count(producer.deliver.messages, 10, tags: [client:racecar])"
        );

        let emission = MetricEmission::new(MetricKind::Increment, "producer.ack.messages", None, &tags);
        assert_eq!(
            emission.to_string(),
            "increment(producer.ack.messages, tags: [client:racecar])"
        );
    }
}
