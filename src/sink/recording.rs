//! In-memory sink that records every call.

use std::sync::{Mutex, MutexGuard};

use super::{MetricEmission, MetricKind, MetricsSink};
use crate::tags::TagSet;

/// Sink that appends each call to a list instead of shipping it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    emissions: Mutex<Vec<MetricEmission>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in call order.
    pub fn emissions(&self) -> Vec<MetricEmission> {
        self.lock().clone()
    }

    /// Drain the recorded emissions.
    pub fn take(&self) -> Vec<MetricEmission> {
        std::mem::take(&mut *self.lock())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn record(&self, kind: MetricKind, name: &str, value: Option<f64>, tags: &TagSet) {
        self.lock().push(MetricEmission::new(kind, name, value, tags));
    }

    // A panic while holding the lock only ever interrupts a push.
    fn lock(&self) -> MutexGuard<'_, Vec<MetricEmission>> {
        self.emissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MetricsSink for RecordingSink {
    fn increment(&self, name: &str, tags: &TagSet) {
        self.record(MetricKind::Increment, name, None, tags);
    }

    fn count(&self, name: &str, value: i64, tags: &TagSet) {
        self.record(MetricKind::Count, name, Some(value as f64), tags);
    }

    fn gauge(&self, name: &str, value: f64, tags: &TagSet) {
        self.record(MetricKind::Gauge, name, Some(value), tags);
    }

    fn histogram(&self, name: &str, value: f64, tags: &TagSet) {
        self.record(MetricKind::Histogram, name, Some(value), tags);
    }

    fn timing(&self, name: &str, duration_ms: f64, tags: &TagSet) {
        self.record(MetricKind::Timing, name, Some(duration_ms), tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::client_only;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_records_in_call_order() {
        let sink = RecordingSink::new();
        let tags = client_only("racecar");

        sink.increment("a", &tags);
        sink.count("b", 3, &tags);
        sink.gauge("c", 1.5, &tags);

        let emissions = sink.emissions();
        assert_eq!(emissions.len(), 3);
        assert_eq!(emissions[0].kind, MetricKind::Increment);
        assert_eq!(emissions[0].value, None);
        assert_eq!(emissions[1].value, Some(3.0));
        assert_eq!(emissions[2].name, "c");
    }

    #[test]
    fn test_take_drains() {
        let sink = RecordingSink::new();
        sink.timing("t", 10.0, &TagSet::default());

        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_concurrent_recording() {
        let sink = Arc::new(RecordingSink::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for _ in 0..100 {
                        sink.increment("n", &TagSet::default());
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(sink.len(), 800);
    }
}
