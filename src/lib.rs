//! kafka-lifecycle-metrics: turns Kafka consumer/producer lifecycle events
//! into tagged counters, gauges, histograms and timings.
//!
//! - `event` - Typed lifecycle events and their payloads
//! - `tags` - `key:value` tag sets for each metric family
//! - `sink` - The `MetricsSink` contract plus facade and recording sinks
//! - `subscriber` - Consumer and producer event-to-metric mapping
//! - `notifications` - In-process bus that times operations and routes events
//! - `exporter` - Prometheus exporter for the facade sink
//! - `config` - YAML configuration with environment interpolation
//! - `error` - Error types
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kafka_lifecycle_metrics::{ConsumerSubscriber, FacadeSink, Notifier};
//! use kafka_lifecycle_metrics::event::GroupMembership;
//!
//! let notifier = Notifier::new();
//! notifier.subscribe(Arc::new(ConsumerSubscriber::new(Arc::new(FacadeSink::new()))));
//!
//! notifier.instrument(
//!     kafka_lifecycle_metrics::event::Payload::JoinGroup(GroupMembership {
//!         client_id: "racecar".into(),
//!         group_id: "test_group".into(),
//!     }),
//!     || join_group(),
//! );
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod exporter;
pub mod notifications;
pub mod sink;
pub mod subscriber;
pub mod tags;
pub mod tracing;

// Re-export main types
pub use config::{Config, MetricsConfig};
pub use error::{ConfigError, EventError, MetricsError};
pub use event::{Event, EventName, Payload};
pub use notifications::Notifier;
pub use sink::{FacadeSink, MetricEmission, MetricKind, MetricsSink, RecordingSink};
pub use subscriber::{Clock, ConsumerSubscriber, ProducerSubscriber, Subscriber, SystemClock};
pub use tags::{TagBuilder, TagSet};
