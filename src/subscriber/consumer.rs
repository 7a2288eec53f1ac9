//! Consumer-side metrics.
//!
//! | Event           | Metrics                                                        |
//! |-----------------|----------------------------------------------------------------|
//! | process_message | `consumer.process_message.latency`, `consumer.offset`, `consumer.time_lag` |
//! | process_batch   | `consumer.process_batch.latency`, `consumer.messages`, `consumer.offset` |
//! | join_group      | `consumer.join_group`                                          |
//! | leave_group     | `consumer.leave_group`                                         |
//! | main_loop       | `consumer.loop.duration`                                       |
//! | pause_status    | `consumer.pause.duration`                                      |
//!
//! Failed operations swap latency for an `.errors` counter (message and
//! batch) or add one next to the timing (group membership).

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{Clock, Subscriber, SystemClock};
use crate::event::{
    Event, EventName, GroupMembership, MainLoop, Payload, PauseStatus, ProcessBatch,
    ProcessMessage,
};
use crate::sink::MetricsSink;
use crate::tags::{client_group, client_group_topic_partition};

const EVENTS: &[EventName] = &[
    EventName::ProcessMessage,
    EventName::ProcessBatch,
    EventName::JoinGroup,
    EventName::LeaveGroup,
    EventName::MainLoop,
    EventName::PauseStatus,
];

/// Translates consumer lifecycle events into metrics.
#[derive(Clone)]
pub struct ConsumerSubscriber {
    sink: Arc<dyn MetricsSink>,
    clock: Arc<dyn Clock>,
}

impl ConsumerSubscriber {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        Self::with_clock(sink, Arc::new(SystemClock))
    }

    /// Use `clock` as the observation instant for `consumer.time_lag`.
    pub fn with_clock(sink: Arc<dyn MetricsSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    pub fn process_message(&self, event: &Event, payload: &ProcessMessage) {
        let tags = client_group_topic_partition(
            &payload.client_id,
            &payload.group_id,
            &payload.topic,
            payload.partition,
        );

        if let Some(error) = &event.error {
            warn!(
                topic = %payload.topic,
                partition = payload.partition,
                offset = payload.offset,
                error = %error,
                "Message processing failed"
            );
            self.sink.increment("consumer.process_message.errors", &tags);
        } else {
            self.sink
                .timing("consumer.process_message.latency", event.duration_ms(), &tags);
        }

        self.sink.gauge("consumer.offset", payload.offset as f64, &tags);

        let time_lag = (self.clock.now() - payload.create_time).num_milliseconds();
        if time_lag < 0 {
            // Clock skew between broker and consumer; reported as-is.
            debug!(
                topic = %payload.topic,
                partition = payload.partition,
                time_lag,
                "Negative time lag"
            );
        }
        self.sink.gauge("consumer.time_lag", time_lag as f64, &tags);
    }

    pub fn process_batch(&self, event: &Event, payload: &ProcessBatch) {
        let tags = client_group_topic_partition(
            &payload.client_id,
            &payload.group_id,
            &payload.topic,
            payload.partition,
        );

        if let Some(error) = &event.error {
            warn!(
                topic = %payload.topic,
                partition = payload.partition,
                first_offset = payload.first_offset,
                last_offset = payload.last_offset,
                error = %error,
                "Batch processing failed"
            );
            self.sink.increment("consumer.process_batch.errors", &tags);
        } else {
            self.sink
                .timing("consumer.process_batch.latency", event.duration_ms(), &tags);
            self.sink.count(
                "consumer.messages",
                i64::try_from(payload.message_count).unwrap_or(i64::MAX),
                &tags,
            );
        }

        self.sink
            .gauge("consumer.offset", payload.last_offset as f64, &tags);
    }

    pub fn join_group(&self, event: &Event, payload: &GroupMembership) {
        self.group_membership(event, payload, "consumer.join_group", "consumer.join_group.errors");
    }

    pub fn leave_group(&self, event: &Event, payload: &GroupMembership) {
        self.group_membership(event, payload, "consumer.leave_group", "consumer.leave_group.errors");
    }

    fn group_membership(
        &self,
        event: &Event,
        payload: &GroupMembership,
        metric: &str,
        error_metric: &str,
    ) {
        let tags = client_group(&payload.client_id, &payload.group_id);
        self.sink.timing(metric, event.duration_ms(), &tags);

        if let Some(error) = &event.error {
            warn!(group_id = %payload.group_id, error = %error, "{} failed", event.name());
            self.sink.increment(error_metric, &tags);
        }
    }

    pub fn main_loop(&self, event: &Event, payload: &MainLoop) {
        let tags = client_group(&payload.client_id, &payload.group_id);
        self.sink
            .histogram("consumer.loop.duration", event.duration_ms(), &tags);
    }

    pub fn pause_status(&self, _event: &Event, payload: &PauseStatus) {
        let tags = client_group_topic_partition(
            &payload.client_id,
            &payload.group_id,
            &payload.topic,
            payload.partition,
        );
        self.sink.gauge("consumer.pause.duration", payload.duration, &tags);
    }
}

impl Subscriber for ConsumerSubscriber {
    fn events(&self) -> &'static [EventName] {
        EVENTS
    }

    fn handle(&self, event: &Event) {
        trace!(
            event = %event.name(),
            duration_ms = event.duration_ms(),
            "Consumer event"
        );

        match &event.payload {
            Payload::ProcessMessage(payload) => self.process_message(event, payload),
            Payload::ProcessBatch(payload) => self.process_batch(event, payload),
            Payload::JoinGroup(payload) => self.join_group(event, payload),
            Payload::LeaveGroup(payload) => self.leave_group(event, payload),
            Payload::MainLoop(payload) => self.main_loop(event, payload),
            Payload::PauseStatus(payload) => self.pause_status(event, payload),
            Payload::ProduceMessage(_)
            | Payload::DeliverMessages(_)
            | Payload::AcknowledgedMessage(_) => {
                trace!(event = %event.name(), "Not a consumer event, ignoring");
            }
        }
    }
}
