//! Registry and exposition behavior tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use metricforge_core::{LabelSet, MetricKind, MetricRegistry, Observation, SeriesKey};

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    pairs.iter().copied().collect()
}

#[test]
fn counter_accumulates_and_renders_one_line() {
    let registry = MetricRegistry::new();
    let key = SeriesKey::new("requests", labels(&[("env", "prod")]));
    for _ in 0..3 {
        registry.record(&key, MetricKind::Counter, Observation::Value(5.0));
    }
    assert_eq!(registry.render_exposition(), "requests{env=\"prod\"} 15\n");
    assert_eq!(registry.len(), 1);
}

#[test]
fn empty_labels_render_a_bare_name() {
    let registry = MetricRegistry::new();
    let key = SeriesKey::new("jobs", LabelSet::new());
    registry.record(&key, MetricKind::Counter, Observation::Value(2.0));
    assert_eq!(registry.render_exposition(), "jobs 2\n");
}

#[test]
fn label_order_collapses_to_one_identity() {
    let registry = MetricRegistry::new();
    let a = SeriesKey::new("hits", labels(&[("env", "prod"), ("zone", "eu")]));
    let b = SeriesKey::new("hits", labels(&[("zone", "eu"), ("env", "prod")]));
    assert_eq!(a, b);
    registry.record(&a, MetricKind::Counter, Observation::Value(1.0));
    registry.record(&b, MetricKind::Counter, Observation::Value(1.0));
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.render_exposition(),
        "hits{env=\"prod\",zone=\"eu\"} 2\n"
    );
}

#[test]
fn one_entry_per_identity_no_matter_how_many_records() {
    let registry = MetricRegistry::new();
    let key = SeriesKey::new("ticks", LabelSet::new());
    for _ in 0..500 {
        registry.record(&key, MetricKind::Counter, Observation::Value(1.0));
    }
    let out = registry.render_exposition();
    assert_eq!(out.lines().count(), 1);
    assert_eq!(out, "ticks 500\n");
}

#[test]
fn gauge_renders_the_live_producer_value() {
    let registry = MetricRegistry::new();
    let key = SeriesKey::new("depth", LabelSet::new());
    let cell = Arc::new(AtomicU64::new(7));
    let reader = cell.clone();
    registry.record(
        &key,
        MetricKind::Gauge,
        Observation::Producer(Arc::new(move || reader.load(Ordering::Relaxed) as f64)),
    );
    assert_eq!(registry.render_exposition(), "depth 7\n");
    // No intervening write: repeated renders agree.
    assert_eq!(registry.render_exposition(), "depth 7\n");
    cell.store(42, Ordering::Relaxed);
    assert_eq!(registry.render_exposition(), "depth 42\n");
}

#[test]
fn gauge_value_observation_installs_a_constant() {
    let registry = MetricRegistry::new();
    let key = SeriesKey::new("level", LabelSet::new());
    registry.record(&key, MetricKind::Gauge, Observation::Value(1.5));
    assert_eq!(registry.render_exposition(), "level 1.5\n");
    registry.record(&key, MetricKind::Gauge, Observation::Value(3.0));
    assert_eq!(registry.render_exposition(), "level 3\n");
}

#[test]
fn mismatched_kind_is_a_no_op() {
    let registry = MetricRegistry::new();
    let key = SeriesKey::new("requests", labels(&[("env", "prod")]));
    registry.record(&key, MetricKind::Counter, Observation::Value(5.0));
    // Same identity re-declared as other kinds: first kind wins, samples drop.
    registry.record(&key, MetricKind::Histogram, Observation::Value(9.0));
    registry.record(&key, MetricKind::Gauge, Observation::Value(9.0));
    registry.record(&key, MetricKind::Summary, Observation::Value(9.0));
    assert_eq!(registry.render_exposition(), "requests{env=\"prod\"} 5\n");
    assert_eq!(registry.len(), 1);
}

#[test]
fn concurrent_writers_to_distinct_identities_stay_exact() {
    let registry = Arc::new(MetricRegistry::new());
    let writers = 8;
    let per_writer = 1_000u64;
    thread::scope(|scope| {
        for w in 0..writers {
            let registry = registry.clone();
            scope.spawn(move || {
                let key = SeriesKey::new(format!("worker_{}", w), LabelSet::new());
                for _ in 0..per_writer {
                    registry.record(&key, MetricKind::Counter, Observation::Value(3.0));
                }
            });
        }
    });
    let out = registry.render_exposition();
    assert_eq!(out.lines().count(), writers);
    for w in 0..writers {
        let expected = format!("worker_{} {}", w, per_writer * 3);
        assert!(out.lines().any(|l| l == expected), "missing {:?} in {}", expected, out);
    }
}

#[test]
fn concurrent_writers_to_the_same_identity_sum_exactly() {
    let registry = Arc::new(MetricRegistry::new());
    let writers = 8u64;
    let per_writer = 1_000u64;
    thread::scope(|scope| {
        for _ in 0..writers {
            let registry = registry.clone();
            scope.spawn(move || {
                let key = SeriesKey::new("shared", LabelSet::new());
                for _ in 0..per_writer {
                    registry.record(&key, MetricKind::Counter, Observation::Value(1.0));
                }
            });
        }
    });
    assert_eq!(
        registry.render_exposition(),
        format!("shared {}\n", writers * per_writer)
    );
}

#[test]
fn render_is_sorted_by_identity() {
    let registry = MetricRegistry::new();
    registry.record(
        &SeriesKey::new("beta", LabelSet::new()),
        MetricKind::Counter,
        Observation::Value(1.0),
    );
    registry.record(
        &SeriesKey::new("alpha", labels(&[("zone", "eu")])),
        MetricKind::Counter,
        Observation::Value(1.0),
    );
    registry.record(
        &SeriesKey::new("alpha", LabelSet::new()),
        MetricKind::Counter,
        Observation::Value(1.0),
    );
    assert_eq!(
        registry.render_exposition(),
        "alpha 1\nalpha{zone=\"eu\"} 1\nbeta 1\n"
    );
}

#[test]
fn default_labels_ride_only_on_the_widened_render() {
    let registry = MetricRegistry::new();
    registry.record(
        &SeriesKey::new("requests", labels(&[("env", "prod")])),
        MetricKind::Counter,
        Observation::Value(4.0),
    );
    registry.record(
        &SeriesKey::new("jobs", LabelSet::new()),
        MetricKind::Counter,
        Observation::Value(1.0),
    );
    let defaults = labels(&[("origin", "forge"), ("env", "staging")]);
    assert_eq!(
        registry.render_with(&defaults),
        "jobs{env=\"staging\",origin=\"forge\"} 1\nrequests{env=\"prod\",origin=\"forge\"} 4\n"
    );
    // The pull render stays unwidened and consistent with the same state.
    assert_eq!(
        registry.render_exposition(),
        "jobs 1\nrequests{env=\"prod\"} 4\n"
    );
}

#[test]
fn histogram_series_render_buckets_through_the_registry() {
    let registry = MetricRegistry::new();
    let key = SeriesKey::new("latency", labels(&[("env", "prod")]));
    registry.record(&key, MetricKind::Histogram, Observation::Value(1.0));
    registry.record(&key, MetricKind::Histogram, Observation::Value(1.0));
    assert_eq!(
        registry.render_exposition(),
        "latency_bucket{env=\"prod\",vmrange=\"8.799e-01...1.000e+00\"} 2\n\
         latency_sum{env=\"prod\"} 2\n\
         latency_count{env=\"prod\"} 2\n"
    );
}

#[test]
fn summary_series_render_quantiles_through_the_registry() {
    let registry = MetricRegistry::new();
    let key = SeriesKey::new("payload", LabelSet::new());
    registry.record(&key, MetricKind::Summary, Observation::Value(8.0));
    let out = registry.render_exposition();
    assert!(out.starts_with("payload{quantile=\"0.5\"} 8\n"), "got: {}", out);
    assert!(out.contains("payload{quantile=\"1\"} 8\n"), "got: {}", out);
    assert!(out.ends_with("payload_count 1\n"), "got: {}", out);
}

#[test]
fn empty_distributions_render_nothing_until_sampled() {
    let registry = MetricRegistry::new();
    let key = SeriesKey::new("latency", LabelSet::new());
    // A mismatched first-producer observation creates the series but records
    // no sample.
    registry.record(&key, MetricKind::Histogram, Observation::Producer(Arc::new(|| 1.0)));
    assert_eq!(registry.render_exposition(), "");
    registry.record(&key, MetricKind::Histogram, Observation::Value(1.0));
    assert!(!registry.render_exposition().is_empty());
}
