//! Log-scale histogram accumulator.
//!
//! Buckets cover 10^-9 .. 10^18 with 18 buckets per decade, matching the
//! `vmrange` exposition ingested natively by VictoriaMetrics-style backends.
//! Only non-empty buckets are stored and rendered; samples outside the
//! covered range land in dedicated lower/upper buckets. Negative and NaN
//! samples are ignored.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::{Mutex, PoisonError};

use super::fmt_value;

const E10_MIN: i32 = -9;
const E10_MAX: i32 = 18;
const BUCKETS_PER_DECIMAL: u32 = 18;
const BUCKET_COUNT: u32 = (E10_MAX - E10_MIN) as u32 * BUCKETS_PER_DECIMAL;

/// Distribution accumulator with log-scale `vmrange` buckets.
pub struct Histogram {
    inner: Mutex<HistogramInner>,
}

#[derive(Default)]
struct HistogramInner {
    buckets: BTreeMap<u32, u64>,
    lower: u64,
    upper: u64,
    sum: f64,
}

impl HistogramInner {
    fn count(&self) -> u64 {
        self.lower + self.upper + self.buckets.values().sum::<u64>()
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HistogramInner::default()),
        }
    }

    /// Record one sample. Negative and NaN samples are ignored.
    pub fn update(&self, v: f64) {
        if v.is_nan() || v < 0.0 {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.sum += v;
        let pos = (v.log10() - f64::from(E10_MIN)) * f64::from(BUCKETS_PER_DECIMAL);
        if pos < 0.0 {
            inner.lower += 1;
        } else if pos >= f64::from(BUCKET_COUNT) {
            inner.upper += 1;
        } else {
            let mut idx = pos as u32;
            // A sample exactly on a bucket edge belongs to the bucket below.
            if pos == f64::from(idx) && idx > 0 {
                idx -= 1;
            }
            *inner.buckets.entry(idx).or_insert(0) += 1;
        }
    }

    /// Total recorded samples.
    pub fn count(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count()
    }

    /// Render `_bucket`/`_sum`/`_count` lines. Nothing renders before the
    /// first sample.
    pub(crate) fn render_into(&self, out: &mut String, name: &str, labels: &str) {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let count = inner.count();
        if count == 0 {
            return;
        }
        let prefix = if labels.is_empty() {
            String::new()
        } else {
            format!("{},", labels)
        };
        if inner.lower > 0 {
            let _ = writeln!(
                out,
                "{}_bucket{{{}vmrange=\"0...{}\"}} {}",
                name,
                prefix,
                format_e3(10f64.powi(E10_MIN)),
                inner.lower
            );
        }
        for (&idx, &n) in inner.buckets.iter() {
            let _ = writeln!(
                out,
                "{}_bucket{{{}vmrange=\"{}\"}} {}",
                name,
                prefix,
                bucket_range(idx),
                n
            );
        }
        if inner.upper > 0 {
            let _ = writeln!(
                out,
                "{}_bucket{{{}vmrange=\"{}...+Inf\"}} {}",
                name,
                prefix,
                format_e3(10f64.powi(E10_MAX)),
                inner.upper
            );
        }
        if labels.is_empty() {
            let _ = writeln!(out, "{}_sum {}", name, fmt_value(inner.sum));
            let _ = writeln!(out, "{}_count {}", name, count);
        } else {
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, fmt_value(inner.sum));
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Value range covered by bucket `idx` as a `vmrange` string.
fn bucket_range(idx: u32) -> String {
    let multiplier = 10f64.powf(1.0 / f64::from(BUCKETS_PER_DECIMAL));
    let start = 10f64.powi(E10_MIN) * multiplier.powi(idx as i32);
    format!("{}...{}", format_e3(start), format_e3(start * multiplier))
}

/// `%.3e`-style float form with a signed two-digit exponent.
fn format_e3(v: f64) -> String {
    let s = format!("{:.3e}", v);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(rest) => ('-', rest),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => s,
    }
}
