//! Typed lifecycle events.
//!
//! Each lifecycle point of the consumer/producer runtime has its own payload
//! struct. Fields a metric depends on are plain struct fields, so an event
//! can't be built without them and dispatch never has to check for their
//! presence.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::OptionExt;

use crate::error::{EventError, UnknownEventNameSnafu};

/// Name of an instrumented lifecycle point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    ProcessMessage,
    ProcessBatch,
    JoinGroup,
    LeaveGroup,
    MainLoop,
    PauseStatus,
    ProduceMessage,
    DeliverMessages,
    AcknowledgedMessage,
}

impl EventName {
    /// Every event name, consumer side first.
    pub const ALL: [EventName; 9] = [
        EventName::ProcessMessage,
        EventName::ProcessBatch,
        EventName::JoinGroup,
        EventName::LeaveGroup,
        EventName::MainLoop,
        EventName::PauseStatus,
        EventName::ProduceMessage,
        EventName::DeliverMessages,
        EventName::AcknowledgedMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::ProcessMessage => "process_message",
            EventName::ProcessBatch => "process_batch",
            EventName::JoinGroup => "join_group",
            EventName::LeaveGroup => "leave_group",
            EventName::MainLoop => "main_loop",
            EventName::PauseStatus => "pause_status",
            EventName::ProduceMessage => "produce_message",
            EventName::DeliverMessages => "deliver_messages",
            EventName::AcknowledgedMessage => "acknowledged_message",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = EventError;

    /// Parses `process_message` as well as the namespaced
    /// `process_message.racecar` form used by notification buses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.split_once('.').map_or(s, |(name, _)| name);
        EventName::ALL
            .into_iter()
            .find(|name| name.as_str() == bare)
            .context(UnknownEventNameSnafu { name: s })
    }
}

// ============================================================================
// Consumer payloads
// ============================================================================

/// A single message went through the consumer's handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessMessage {
    pub client_id: String,
    pub group_id: String,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Broker or producer timestamp of the message.
    pub create_time: DateTime<Utc>,
}

/// A batch of messages went through the consumer's handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessBatch {
    pub client_id: String,
    pub group_id: String,
    pub topic: String,
    pub partition: i32,
    pub first_offset: i64,
    pub last_offset: i64,
    pub message_count: u64,
}

/// Joining or leaving the consumer group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub client_id: String,
    pub group_id: String,
}

/// One iteration of the consumer main loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainLoop {
    pub client_id: String,
    pub group_id: String,
}

/// How long a paused partition has been paused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseStatus {
    pub client_id: String,
    pub group_id: String,
    pub topic: String,
    pub partition: i32,
    /// Time spent paused, in whatever unit the runtime reports.
    pub duration: f64,
}

// ============================================================================
// Producer payloads
// ============================================================================

/// A message was appended to the producer buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProduceMessage {
    pub client_id: String,
    pub topic: String,
    /// Size of the message value in bytes.
    pub message_size: u64,
    /// Number of messages buffered after this one was added.
    pub buffer_size: u64,
}

/// The producer flushed its buffer to the brokers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverMessages {
    pub client_id: String,
    pub delivered_message_count: u64,
}

/// The broker acknowledged a produced message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcknowledgedMessage {
    pub client_id: String,
}

/// Payload of an [`Event`], one variant per [`EventName`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Payload {
    ProcessMessage(ProcessMessage),
    ProcessBatch(ProcessBatch),
    JoinGroup(GroupMembership),
    LeaveGroup(GroupMembership),
    MainLoop(MainLoop),
    PauseStatus(PauseStatus),
    ProduceMessage(ProduceMessage),
    DeliverMessages(DeliverMessages),
    AcknowledgedMessage(AcknowledgedMessage),
}

impl Payload {
    pub fn name(&self) -> EventName {
        match self {
            Payload::ProcessMessage(_) => EventName::ProcessMessage,
            Payload::ProcessBatch(_) => EventName::ProcessBatch,
            Payload::JoinGroup(_) => EventName::JoinGroup,
            Payload::LeaveGroup(_) => EventName::LeaveGroup,
            Payload::MainLoop(_) => EventName::MainLoop,
            Payload::PauseStatus(_) => EventName::PauseStatus,
            Payload::ProduceMessage(_) => EventName::ProduceMessage,
            Payload::DeliverMessages(_) => EventName::DeliverMessages,
            Payload::AcknowledgedMessage(_) => EventName::AcknowledgedMessage,
        }
    }
}

macro_rules! impl_from_payload {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Payload {
                fn from(payload: $ty) -> Self {
                    Payload::$ty(payload)
                }
            }
        )*
    };
}

impl_from_payload!(
    ProcessMessage,
    ProcessBatch,
    MainLoop,
    PauseStatus,
    ProduceMessage,
    DeliverMessages,
    AcknowledgedMessage,
);

/// A finished lifecycle notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when the instrumented operation failed.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Event {
    pub fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        payload: impl Into<Payload>,
    ) -> Self {
        Self {
            started_at,
            finished_at,
            error: None,
            payload: payload.into(),
        }
    }

    /// Build an event that finished at `finished_at` and took `duration`.
    ///
    /// A duration reaching past the earliest representable instant starts
    /// the event at that instant.
    pub fn with_duration(
        finished_at: DateTime<Utc>,
        duration: Duration,
        payload: impl Into<Payload>,
    ) -> Self {
        let started_at = chrono::TimeDelta::from_std(duration)
            .ok()
            .and_then(|elapsed| finished_at.checked_sub_signed(elapsed))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(started_at, finished_at, payload)
    }

    /// Mark the instrumented operation as failed.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn name(&self) -> EventName {
        self.payload.name()
    }

    /// Wall time between start and finish. Zero if the clock went backwards.
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Duration in whole milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration().as_millis() as f64
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
