//! Event subscribers that turn lifecycle events into metric emissions.
//!
//! One subscriber per runtime role:
//! - `consumer`: message/batch processing, group membership, main loop, pauses
//! - `producer`: produce, deliver and acknowledge
//!
//! Subscribers hold no state besides their sink and clock, so one instance
//! can be shared across threads and called concurrently.

pub mod consumer;
pub mod producer;

pub use consumer::ConsumerSubscriber;
pub use producer::ProducerSubscriber;

use chrono::{DateTime, Utc};

use crate::event::{Event, EventName};

/// Receives lifecycle events from an event source.
pub trait Subscriber: Send + Sync {
    /// Event names this subscriber handles.
    fn events(&self) -> &'static [EventName];

    /// Emit the metrics derived from `event`.
    ///
    /// Events outside [`Subscriber::events`] are ignored.
    fn handle(&self, event: &Event);
}

/// Source of the observation instant used for lag computations.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fixed instant.
impl Clock for DateTime<Utc> {
    fn now(&self) -> DateTime<Utc> {
        *self
    }
}
