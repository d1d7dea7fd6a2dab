//! Criterion benchmarks for the touch hot path.
//!
//! Every touch event runs through the classifier and every frame through the
//! batcher, so both must stay far below one frame (16ms) even on a phone.
//!
//! Run with:
//! ```bash
//! cargo bench --package pad-touch --bench classifier_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pad_touch::application::batch_moves::MovementBatcher;
use pad_touch::application::classify_gestures::GestureClassifier;
use pad_touch::domain::contact::{TouchEvent, TouchPoint};

// ── Trace fixtures ────────────────────────────────────────────────────────────

/// One contact sliding right for 60 frames, past the tap window.
fn pointer_trace() -> Vec<TouchEvent> {
    let mut events = vec![TouchEvent::began(0, vec![TouchPoint::new(1, 0.0, 0.0)])];
    for i in 1..=60u32 {
        let x = f64::from(i) * 4.0;
        events.push(TouchEvent::moved(
            200 + u64::from(i) * 16,
            vec![TouchPoint::new(1, x, x * 0.25)],
        ));
    }
    events.push(TouchEvent::ended(1200, vec![TouchPoint::new(1, 240.0, 60.0)]));
    events
}

/// Two contacts scrolling down for 60 frames.
fn scroll_trace() -> Vec<TouchEvent> {
    let down = |y: f64| vec![TouchPoint::new(1, 100.0, y), TouchPoint::new(2, 200.0, y)];
    let mut events = vec![TouchEvent::began(0, down(300.0))];
    for i in 1..=60u32 {
        events.push(TouchEvent::moved(u64::from(i) * 16, down(300.0 + f64::from(i) * 3.0)));
    }
    events.push(TouchEvent::ended(1000, down(480.0)));
    events
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_classifier(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier");
    for (name, trace) in [("pointer", pointer_trace()), ("scroll", scroll_trace())] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut classifier = GestureClassifier::new();
                let mut emitted = 0usize;
                for event in &trace {
                    emitted += classifier.handle(black_box(event)).len();
                }
                emitted
            })
        });
    }
    group.finish();
}

fn bench_batcher(c: &mut Criterion) {
    c.bench_function("batcher/push_flush_frame", |b| {
        let mut batcher = MovementBatcher::default();
        b.iter(|| {
            for _ in 0..4 {
                batcher.push(black_box(2.5), black_box(-1.25));
            }
            batcher.flush(black_box(1.5))
        })
    });
}

criterion_group!(benches, bench_classifier, bench_batcher);
criterion_main!(benches);
