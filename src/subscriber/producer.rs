//! Producer-side metrics.

use std::sync::Arc;

use tracing::trace;

use super::Subscriber;
use crate::event::{AcknowledgedMessage, DeliverMessages, Event, EventName, Payload, ProduceMessage};
use crate::sink::MetricsSink;
use crate::tags::{client_only, client_topic};

const EVENTS: &[EventName] = &[
    EventName::ProduceMessage,
    EventName::DeliverMessages,
    EventName::AcknowledgedMessage,
];

/// Translates producer lifecycle events into metrics.
#[derive(Clone)]
pub struct ProducerSubscriber {
    sink: Arc<dyn MetricsSink>,
}

impl ProducerSubscriber {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        Self { sink }
    }

    pub fn produce_message(&self, _event: &Event, payload: &ProduceMessage) {
        let tags = client_topic(&payload.client_id, &payload.topic);
        let message_size = payload.message_size as f64;

        // Write rate.
        self.sink.increment("producer.produce.messages", &tags);

        self.sink
            .histogram("producer.produce.message_size", message_size, &tags);
        self.sink.count(
            "producer.produce.message_size.sum",
            i64::try_from(payload.message_size).unwrap_or(i64::MAX),
            &tags,
        );

        self.sink
            .histogram("producer.buffer.size", payload.buffer_size as f64, &tags);
    }

    pub fn deliver_messages(&self, event: &Event, payload: &DeliverMessages) {
        let tags = client_only(&payload.client_id);

        self.sink
            .timing("producer.deliver.latency", event.duration_ms(), &tags);
        self.sink.count(
            "producer.deliver.messages",
            i64::try_from(payload.delivered_message_count).unwrap_or(i64::MAX),
            &tags,
        );
    }

    pub fn acknowledged_message(&self, _event: &Event, payload: &AcknowledgedMessage) {
        let tags = client_only(&payload.client_id);
        self.sink.increment("producer.ack.messages", &tags);
    }
}

impl Subscriber for ProducerSubscriber {
    fn events(&self) -> &'static [EventName] {
        EVENTS
    }

    fn handle(&self, event: &Event) {
        trace!(
            event = %event.name(),
            duration_ms = event.duration_ms(),
            "Producer event"
        );

        match &event.payload {
            Payload::ProduceMessage(payload) => self.produce_message(event, payload),
            Payload::DeliverMessages(payload) => self.deliver_messages(event, payload),
            Payload::AcknowledgedMessage(payload) => self.acknowledged_message(event, payload),
            Payload::ProcessMessage(_)
            | Payload::ProcessBatch(_)
            | Payload::JoinGroup(_)
            | Payload::LeaveGroup(_)
            | Payload::MainLoop(_)
            | Payload::PauseStatus(_) => {
                trace!(event = %event.name(), "Not a producer event, ignoring");
            }
        }
    }
}
