use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rask_log_relay::adapter::elastic::parse_line;
use rask_log_relay::domain::LogEvent;
use rask_log_relay::pipeline::{Dispatcher, parse_event};
use rask_log_relay::port::{DeliveryFuture, LogSink};
use std::sync::Arc;

/// Sink that accepts everything and keeps nothing.
struct NullSink {
    level: i64,
}

impl LogSink for NullSink {
    fn name(&self) -> &str {
        "null"
    }

    fn minimum_level(&self) -> i64 {
        self.level
    }

    fn deliver<'a>(&'a self, event: &'a LogEvent) -> DeliveryFuture<'a> {
        Box::pin(async move {
            black_box(event);
            Ok(())
        })
    }
}

fn make_payload(message_len: usize) -> Vec<u8> {
    let message = "x".repeat(message_len);
    serde_json::to_vec(&serde_json::json!({
        "level": 30,
        "msg": message,
        "identity": "ignored",
        "extra": {"nested": [1, 2, 3]},
    }))
    .unwrap()
}

fn bench_parse_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_event");

    for size in [64, 1024, 16 * 1024] {
        let payload = make_payload(size);
        group.bench_with_input(BenchmarkId::new("message_len", size), &payload, |b, p| {
            b.iter(|| parse_event(black_box(p), "10.0.0.1:5000", "alice"));
        });
    }

    group.bench_function("defaults", |b| {
        b.iter(|| parse_event(black_box(b"{}"), "10.0.0.1:5000", "alice"));
    });

    group.finish();
}

fn bench_parse_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("elastic_parse_line");
    let formatted =
        "2025-01-10 12:00:00 | sync_orders | ERROR | sync failed || order_id: 42; retry: no; shard: 7";

    group.bench_function("formatted", |b| {
        b.iter(|| parse_line(black_box(formatted)));
    });
    group.bench_function("plain", |b| {
        b.iter(|| parse_line(black_box("plain message without separators")));
    });

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let Ok(runtime) = tokio::runtime::Runtime::new() else {
        return;
    };

    for sink_count in [1, 4, 16] {
        // Half the sinks sit above the event level and are skipped.
        let sinks: Vec<Arc<dyn LogSink>> = (0..sink_count)
            .map(|i| {
                let level = if i % 2 == 0 { 0 } else { 50 };
                Arc::new(NullSink { level }) as Arc<dyn LogSink>
            })
            .collect();
        let dispatcher = Dispatcher::new(sinks);
        let event = LogEvent::new(30, "benchmark event", "10.0.0.1:5000", "alice");

        group.bench_with_input(
            BenchmarkId::new("sinks", sink_count),
            &dispatcher,
            |b, dispatcher| {
                b.iter(|| runtime.block_on(dispatcher.dispatch(black_box(event.clone()))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse_event, bench_parse_line, bench_dispatch);
criterion_main!(benches);
