//! Reservoir summary accumulator.
//!
//! Keeps exact running count and sum plus a bounded reservoir of samples
//! (Algorithm R) from which fixed quantiles are estimated at render time by
//! nearest rank over the sorted reservoir.

use std::fmt::Write;
use std::sync::{Mutex, PoisonError};

use rand::Rng;

use super::fmt_value;

/// Quantiles exposed for every summary series.
const QUANTILES: [f64; 5] = [0.5, 0.9, 0.97, 0.99, 1.0];

/// Reservoir capacity; past this, new samples replace slots at decreasing
/// probability.
const RESERVOIR_CAP: usize = 8192;

/// Distribution accumulator exposing quantile estimates.
pub struct Summary {
    inner: Mutex<SummaryInner>,
}

#[derive(Default)]
struct SummaryInner {
    count: u64,
    sum: f64,
    reservoir: Vec<f64>,
}

impl Summary {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SummaryInner::default()),
        }
    }

    /// Record one sample. NaN samples are ignored.
    pub fn update(&self, v: f64) {
        if v.is_nan() {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.count += 1;
        inner.sum += v;
        if inner.reservoir.len() < RESERVOIR_CAP {
            inner.reservoir.push(v);
        } else {
            let slot = rand::rng().random_range(0..inner.count) as usize;
            if slot < RESERVOIR_CAP {
                inner.reservoir[slot] = v;
            }
        }
    }

    /// Total recorded samples.
    pub fn count(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }

    /// Render quantile lines then `_sum`/`_count`. Nothing renders before
    /// the first sample.
    pub(crate) fn render_into(&self, out: &mut String, name: &str, labels: &str) {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.count == 0 {
            return;
        }
        let mut sorted = inner.reservoir.clone();
        sorted.sort_by(f64::total_cmp);
        let prefix = if labels.is_empty() {
            String::new()
        } else {
            format!("{},", labels)
        };
        for q in QUANTILES {
            let _ = writeln!(
                out,
                "{}{{{}quantile=\"{}\"}} {}",
                name,
                prefix,
                fmt_value(q),
                fmt_value(nearest_rank(&sorted, q))
            );
        }
        if labels.is_empty() {
            let _ = writeln!(out, "{}_sum {}", name, fmt_value(inner.sum));
            let _ = writeln!(out, "{}_count {}", name, inner.count);
        } else {
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, fmt_value(inner.sum));
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, inner.count);
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest-rank quantile over a sorted slice; 0 for empty input.
fn nearest_rank(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (q * (sorted.len() - 1) as f64).round() as usize;
    sorted.get(rank.min(sorted.len() - 1)).copied().unwrap_or(0.0)
}
