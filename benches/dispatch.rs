//! Event dispatch benchmarks.
//!
//! Measures the per-event cost of tag construction and sink calls, which
//! runs inline on the consumer's processing thread.

use std::sync::Arc;

use chrono::{Duration, Utc};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use kafka_lifecycle_metrics::event::{ProcessMessage, ProduceMessage};
use kafka_lifecycle_metrics::{
    ConsumerSubscriber, Event, FacadeSink, MetricsSink, ProducerSubscriber, RecordingSink,
    Subscriber,
};

fn process_message_event() -> Event {
    let now = Utc::now();
    Event::new(
        now - Duration::milliseconds(3),
        now,
        ProcessMessage {
            client_id: "bench".to_string(),
            group_id: "bench_group".to_string(),
            topic: "bench_topic".to_string(),
            partition: 7,
            offset: 123_456,
            create_time: now - Duration::milliseconds(40),
        },
    )
}

fn produce_message_event() -> Event {
    let now = Utc::now();
    Event::new(
        now,
        now,
        ProduceMessage {
            client_id: "bench".to_string(),
            topic: "bench_topic".to_string(),
            message_size: 512,
            buffer_size: 64,
        },
    )
}

fn consumer_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("consumer_dispatch");
    group.throughput(Throughput::Elements(1));

    let event = process_message_event();

    // No recorder installed: measures mapping and label building only.
    let facade: Arc<dyn MetricsSink> = Arc::new(FacadeSink::new());
    let subscriber = ConsumerSubscriber::new(facade);
    group.bench_function("process_message_facade", |b| b.iter(|| subscriber.handle(&event)));

    let recording = Arc::new(RecordingSink::new());
    let subscriber = ConsumerSubscriber::new(recording.clone());
    group.bench_function("process_message_recording", |b| {
        b.iter(|| {
            subscriber.handle(&event);
            recording.clear();
        })
    });

    group.finish();
}

fn producer_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("producer_dispatch");
    group.throughput(Throughput::Elements(1));

    let event = produce_message_event();
    let subscriber = ProducerSubscriber::new(Arc::new(FacadeSink::new()));
    group.bench_function("produce_message_facade", |b| b.iter(|| subscriber.handle(&event)));

    group.finish();
}

criterion_group!(benches, consumer_dispatch, producer_dispatch);
criterion_main!(benches);
