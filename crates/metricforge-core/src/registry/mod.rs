//! Concurrency-safe metric registry and exposition rendering.
//!
//! The registry maps a series identity (metric name plus canonical labels) to
//! one live accumulator backed by `DashMap`. Accumulators are created on
//! first write, keep their kind for the process lifetime, and are rendered on
//! demand into the plain-text exposition format consumed by scrapers and
//! shipped by the pusher. Rendering is sorted by identity to keep output
//! deterministic.

mod histogram;
mod summary;

pub use histogram::Histogram;
pub use summary::Summary;

use std::fmt;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;
use serde::de::{Deserializer, Error as DeError, Visitor};
use serde::Deserialize;

use crate::labels::LabelSet;

/// Accumulator kind for one series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetricKind {
    #[default]
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl MetricKind {
    /// Tag used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }
}

impl<'de> Deserialize<'de> for MetricKind {
    /// Accepts the config tag form; unrecognized tags fall back to counter
    /// with a warning, resolved once at load time.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = MetricKind;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a metric kind tag")
            }

            fn visit_str<E: DeError>(self, tag: &str) -> std::result::Result<MetricKind, E> {
                Ok(match tag {
                    "counter" => MetricKind::Counter,
                    "gauge" => MetricKind::Gauge,
                    "histogram" => MetricKind::Histogram,
                    "summary" => MetricKind::Summary,
                    other => {
                        tracing::warn!(tag = other, "unknown metric type, defaulting to counter");
                        MetricKind::Counter
                    }
                })
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

/// Unique identity of one series: metric name plus canonical labels.
///
/// Two definitions with the same name and the same label mapping (in any
/// insertion order) compare equal and share one accumulator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    name: String,
    labels: LabelSet,
}

impl SeriesKey {
    pub fn new(name: impl Into<String>, labels: LabelSet) -> Self {
        Self {
            name: name.into(),
            labels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.name, self.labels)
    }
}

/// Zero-argument callback evaluated at render time for gauge series.
pub type GaugeProducer = Arc<dyn Fn() -> f64 + Send + Sync>;

/// One write into the registry.
pub enum Observation {
    /// A sampled value.
    Value(f64),
    /// A gauge producer to install, replacing any previous one.
    Producer(GaugeProducer),
}

/// Gauge cell holding the current producer. The lock is released before the
/// producer runs so a slow callback never stalls writers.
struct GaugeCell(RwLock<GaugeProducer>);

impl GaugeCell {
    fn new() -> Self {
        Self(RwLock::new(Arc::new(|| 0.0)))
    }

    fn install(&self, producer: GaugeProducer) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = producer;
    }

    fn current(&self) -> f64 {
        let producer = self.0.read().unwrap_or_else(PoisonError::into_inner).clone();
        producer()
    }
}

enum Accumulator {
    Counter(AtomicU64),
    Gauge(GaugeCell),
    Histogram(Histogram),
    Summary(Summary),
}

impl Accumulator {
    fn for_kind(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Counter => Accumulator::Counter(AtomicU64::new(0)),
            MetricKind::Gauge => Accumulator::Gauge(GaugeCell::new()),
            MetricKind::Histogram => Accumulator::Histogram(Histogram::new()),
            MetricKind::Summary => Accumulator::Summary(Summary::new()),
        }
    }

    fn kind(&self) -> MetricKind {
        match self {
            Accumulator::Counter(_) => MetricKind::Counter,
            Accumulator::Gauge(_) => MetricKind::Gauge,
            Accumulator::Histogram(_) => MetricKind::Histogram,
            Accumulator::Summary(_) => MetricKind::Summary,
        }
    }

    fn apply(&self, obs: Observation) {
        match (self, obs) {
            (Accumulator::Counter(total), Observation::Value(v)) => {
                // Truncate toward zero; samples below 1 contribute nothing
                // and the total saturates at u64::MAX instead of wrapping.
                let add = v.trunc();
                if add >= 1.0 {
                    let _ = total.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |t| {
                        Some(t.saturating_add(add as u64))
                    });
                }
            }
            (Accumulator::Gauge(cell), Observation::Producer(producer)) => cell.install(producer),
            (Accumulator::Gauge(cell), Observation::Value(v)) => cell.install(Arc::new(move || v)),
            (Accumulator::Histogram(hist), Observation::Value(v)) => hist.update(v),
            (Accumulator::Summary(summary), Observation::Value(v)) => summary.update(v),
            (acc, Observation::Producer(_)) => {
                tracing::debug!(
                    kind = acc.kind().as_str(),
                    "producer observation on a non-gauge series, dropped"
                );
            }
        }
    }

    fn render_into(&self, out: &mut String, name: &str, labels: &str) {
        match self {
            Accumulator::Counter(total) => {
                write_line(out, name, labels, &total.load(Ordering::Relaxed).to_string());
            }
            Accumulator::Gauge(cell) => {
                write_line(out, name, labels, &fmt_value(cell.current()));
            }
            Accumulator::Histogram(hist) => hist.render_into(out, name, labels),
            Accumulator::Summary(summary) => summary.render_into(out, name, labels),
        }
    }
}

/// Shared, concurrency-safe map of series identities to live accumulators.
///
/// One instance is constructed at startup and handed by `Arc` to every
/// emission loop, the pusher, and the HTTP state. There is no global lookup.
#[derive(Default)]
pub struct MetricRegistry {
    series: DashMap<SeriesKey, Accumulator>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Route one observation to the accumulator for `key`, creating it with
    /// `kind` on first use.
    ///
    /// The first kind recorded under an identity wins for the process
    /// lifetime; later observations declaring a different kind are dropped
    /// with a debug log. The registry never re-types an accumulator.
    pub fn record(&self, key: &SeriesKey, kind: MetricKind, obs: Observation) {
        let acc = self
            .series
            .entry(key.clone())
            .or_insert_with(|| Accumulator::for_kind(kind));
        if acc.kind() != kind {
            tracing::debug!(
                series = %key,
                bound = acc.kind().as_str(),
                declared = kind.as_str(),
                "kind mismatch on existing series, sample dropped"
            );
            return;
        }
        acc.apply(obs);
    }

    /// Render the pull snapshot: every live series, sorted by identity.
    pub fn render_exposition(&self) -> String {
        self.render_with(&LabelSet::new())
    }

    /// Render the snapshot with `defaults` merged into every series. The push
    /// path uses this to carry global tags; per-series labels win on key
    /// collision. Safe to call concurrently with writers.
    pub fn render_with(&self, defaults: &LabelSet) -> String {
        let mut keys: Vec<SeriesKey> = self.series.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        let mut out = String::new();
        for key in keys {
            if let Some(acc) = self.series.get(&key) {
                let labels = key.labels().merged_over(defaults).render();
                acc.render_into(&mut out, key.name(), &labels);
            }
        }
        out
    }
}

/// `name value` or `name{labels} value` plus newline.
fn write_line(out: &mut String, name: &str, labels: &str, value: &str) {
    if labels.is_empty() {
        let _ = writeln!(out, "{} {}", name, value);
    } else {
        let _ = writeln!(out, "{}{{{}}} {}", name, labels, value);
    }
}

/// Render a float for exposition: integral values without a decimal point,
/// non-finite values in the `+Inf`/`-Inf`/`NaN` spelling.
pub(crate) fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_value_forms() {
        assert_eq!(fmt_value(10.0), "10");
        assert_eq!(fmt_value(2.5), "2.5");
        assert_eq!(fmt_value(-3.0), "-3");
        assert_eq!(fmt_value(f64::INFINITY), "+Inf");
        assert_eq!(fmt_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(fmt_value(f64::NAN), "NaN");
    }

    #[test]
    fn series_key_display_always_braces() {
        let bare = SeriesKey::new("jobs", LabelSet::new());
        assert_eq!(bare.to_string(), "jobs{}");
        let labeled = SeriesKey::new("jobs", [("env", "prod")].into_iter().collect());
        assert_eq!(labeled.to_string(), "jobs{env=\"prod\"}");
    }

    #[test]
    fn negative_counter_samples_are_dropped() {
        let registry = MetricRegistry::new();
        let key = SeriesKey::new("c", LabelSet::new());
        registry.record(&key, MetricKind::Counter, Observation::Value(5.9));
        registry.record(&key, MetricKind::Counter, Observation::Value(-3.0));
        registry.record(&key, MetricKind::Counter, Observation::Value(0.4));
        assert_eq!(registry.render_exposition(), "c 5\n");
    }

    #[test]
    fn counter_saturates_instead_of_wrapping() {
        let registry = MetricRegistry::new();
        let key = SeriesKey::new("c", LabelSet::new());
        // Each sample truncates to 2^63; together they exceed u64::MAX.
        registry.record(&key, MetricKind::Counter, Observation::Value(i64::MAX as f64));
        assert_eq!(registry.render_exposition(), format!("c {}\n", 1u64 << 63));
        registry.record(&key, MetricKind::Counter, Observation::Value(i64::MAX as f64));
        assert_eq!(registry.render_exposition(), format!("c {}\n", u64::MAX));
    }
}
