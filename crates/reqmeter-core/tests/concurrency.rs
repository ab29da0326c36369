//! Concurrent updates against a shared registry.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use reqmeter_core::{CounterVec, Gauge, HistogramVec, Registry, SeriesValue, TextEncoder};

const THREADS: usize = 16;
const PER_THREAD: usize = 250;

#[test]
fn no_lost_updates_across_threads() {
    let registry = Registry::new();
    let counter = Arc::new(CounterVec::new("req_total", "Requests", &["status"]).unwrap());
    let hist = Arc::new(
        HistogramVec::new("req_seconds", "Durations", &["status"], &[0.01, 0.1, 1.0]).unwrap(),
    );
    let active = Arc::new(Gauge::new("req_active", "In flight").unwrap());
    registry.register(Arc::clone(&counter)).unwrap();
    registry.register(Arc::clone(&hist)).unwrap();
    registry.register(Arc::clone(&active)).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let counter = Arc::clone(&counter);
            let hist = Arc::clone(&hist);
            let active = Arc::clone(&active);
            thread::spawn(move || {
                let status = if t % 2 == 0 { "200" } else { "500" };
                for i in 0..PER_THREAD {
                    active.inc();
                    counter.inc(&[("status", status)]).unwrap();
                    hist.observe(&[("status", status)], (i % 20) as f64 * 0.01).unwrap();
                    active.dec().unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let expected = (THREADS * PER_THREAD) as f64;
    assert_eq!(counter.total(), expected);
    assert_eq!(hist.total_count(), (THREADS * PER_THREAD) as u64);
    assert_eq!(active.get(), 0.0);

    let snap = registry.snapshot();
    let fam = snap.family("req_seconds").unwrap();
    for s in &fam.series {
        let SeriesValue::Histogram(h) = &s.value else {
            panic!("expected histogram");
        };
        assert!(h.is_consistent());
        assert_eq!(h.count, (THREADS / 2 * PER_THREAD) as u64);
    }
}

#[test]
fn snapshot_while_writing_stays_consistent() {
    let registry = Arc::new(Registry::new());
    let hist = Arc::new(HistogramVec::new("w_seconds", "w", &[], &[0.5, 1.0, 2.0]).unwrap());
    registry.register(Arc::clone(&hist)).unwrap();

    let writer = {
        let hist = Arc::clone(&hist);
        thread::spawn(move || {
            for i in 0..5_000 {
                hist.observe(&[], (i % 4) as f64 * 0.75).unwrap();
            }
        })
    };

    let encoder = TextEncoder::new();
    for _ in 0..200 {
        let out = encoder.encode(&registry.snapshot());
        assert_eq!(out.skipped, 0);
    }
    writer.join().unwrap();
}
