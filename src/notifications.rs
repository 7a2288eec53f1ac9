//! In-process notification bus.
//!
//! The runtime wraps each lifecycle operation in [`Notifier::instrument`];
//! the notifier times it, builds the [`Event`] and hands it to every
//! subscriber registered for that event name. Subscribers run synchronously
//! on the calling thread.

use std::fmt::Display;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::trace;

use crate::event::{Event, Payload};
use crate::subscriber::Subscriber;

/// Routes events to subscribers by event name.
#[derive(Default)]
pub struct Notifier {
    subscribers: RwLock<Vec<Arc<dyn Subscriber>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        trace!(events = ?subscriber.events(), "Subscriber registered");
        subscribers.push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Deliver a finished event to every interested subscriber.
    ///
    /// Returns how many subscribers received it.
    pub fn publish(&self, event: &Event) -> usize {
        let name = event.name();
        // Dispatch outside the lock so a subscriber may subscribe others.
        let interested: Vec<Arc<dyn Subscriber>> = self
            .subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|s| s.events().contains(&name))
            .cloned()
            .collect();

        for subscriber in &interested {
            subscriber.handle(event);
        }

        if interested.is_empty() {
            trace!(event = %name, "No subscriber for event");
        }
        interested.len()
    }

    /// Time `operation` and publish its event once it returns.
    pub fn instrument<T>(&self, payload: impl Into<Payload>, operation: impl FnOnce() -> T) -> T {
        let started_at = Utc::now();
        let output = operation();
        let event = Event::new(started_at, Utc::now(), payload);
        self.publish(&event);
        output
    }

    /// Like [`Notifier::instrument`], recording `Err` as the event's error.
    pub fn instrument_result<T, E: Display>(
        &self,
        payload: impl Into<Payload>,
        operation: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let started_at = Utc::now();
        let output = operation();
        let mut event = Event::new(started_at, Utc::now(), payload);
        if let Err(e) = &output {
            event = event.with_error(e.to_string());
        }
        self.publish(&event);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AcknowledgedMessage, EventName, GroupMembership, ProduceMessage};
    use crate::sink::{MetricKind, RecordingSink};
    use crate::subscriber::{ConsumerSubscriber, ProducerSubscriber};
    use std::thread;

    fn notifier() -> (Notifier, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let notifier = Notifier::new();
        notifier.subscribe(Arc::new(ConsumerSubscriber::new(sink.clone())));
        notifier.subscribe(Arc::new(ProducerSubscriber::new(sink.clone())));
        (notifier, sink)
    }

    fn ack() -> AcknowledgedMessage {
        AcknowledgedMessage {
            client_id: "racecar".to_string(),
        }
    }

    #[test]
    fn test_publish_routes_by_name() {
        let (notifier, sink) = notifier();
        let delivered = notifier.publish(&Event::new(Utc::now(), Utc::now(), ack()));

        assert_eq!(delivered, 1);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.emissions()[0].name, "producer.ack.messages");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let notifier = Notifier::new();
        assert_eq!(notifier.publish(&Event::new(Utc::now(), Utc::now(), ack())), 0);
    }

    #[test]
    fn test_instrument_returns_value_and_times() {
        let (notifier, sink) = notifier();
        let value = notifier.instrument(
            Payload::JoinGroup(GroupMembership {
                client_id: "racecar".to_string(),
                group_id: "test_group".to_string(),
            }),
            || {
                thread::sleep(std::time::Duration::from_millis(20));
                42
            },
        );

        assert_eq!(value, 42);
        let emissions = sink.emissions();
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].kind, MetricKind::Timing);
        assert!(emissions[0].value.unwrap() >= 20.0);
    }

    #[test]
    fn test_instrument_result_records_error() {
        let (notifier, sink) = notifier();
        let result: Result<(), String> = notifier.instrument_result(
            Payload::LeaveGroup(GroupMembership {
                client_id: "racecar".to_string(),
                group_id: "test_group".to_string(),
            }),
            || Err("coordinator unavailable".to_string()),
        );

        assert!(result.is_err());
        let names: Vec<_> = sink.emissions().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["consumer.leave_group", "consumer.leave_group.errors"]);
    }

    struct SubscribesOnAck {
        notifier: Arc<Notifier>,
        sink: Arc<RecordingSink>,
    }

    impl Subscriber for SubscribesOnAck {
        fn events(&self) -> &'static [EventName] {
            &[EventName::AcknowledgedMessage]
        }

        fn handle(&self, _event: &Event) {
            self.notifier
                .subscribe(Arc::new(ProducerSubscriber::new(self.sink.clone())));
        }
    }

    #[test]
    fn test_subscriber_can_subscribe_during_publish() {
        let sink = Arc::new(RecordingSink::new());
        let notifier = Arc::new(Notifier::new());
        notifier.subscribe(Arc::new(SubscribesOnAck {
            notifier: Arc::clone(&notifier),
            sink: sink.clone(),
        }));

        let event = Event::new(Utc::now(), Utc::now(), ack());
        assert_eq!(notifier.publish(&event), 1);
        assert_eq!(notifier.subscriber_count(), 2);
        assert!(sink.is_empty());

        // The subscriber added mid-publish sees the next event.
        assert_eq!(notifier.publish(&event), 2);
        assert_eq!(sink.emissions()[0].name, "producer.ack.messages");
    }

    #[test]
    fn test_concurrent_publish() {
        let (notifier, sink) = notifier();
        let notifier = Arc::new(notifier);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let notifier = Arc::clone(&notifier);
                thread::spawn(move || {
                    for _ in 0..25 {
                        notifier.instrument(
                            ProduceMessage {
                                client_id: format!("client-{i}"),
                                topic: "test_topic".to_string(),
                                message_size: 1,
                                buffer_size: 1,
                            },
                            || (),
                        );
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        // Four emissions per produced message.
        assert_eq!(sink.len(), 4 * 4 * 25);
        assert_eq!(notifier.subscriber_count(), 2);
    }
}
