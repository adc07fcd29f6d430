//! Per-metric emission loops.
//!
//! One detached task per definition. Loops never talk to each other; they
//! communicate only through the shared registry. A zero interval busy-spins
//! (warned at config load) without blocking other loops.

use std::sync::Arc;

use tokio::task::JoinHandle;

use metricforge_core::{GaugeProducer, MetricKind, MetricRegistry, Observation};

use crate::config::MetricDef;

/// Spawn one emission loop per definition. Handles are detached in normal
/// operation; tests hold them to drive the loops under a paused clock.
pub fn spawn_emitters(registry: Arc<MetricRegistry>, defs: &[MetricDef]) -> Vec<JoinHandle<()>> {
    defs.iter()
        .map(|def| tokio::spawn(emit_loop(Arc::clone(&registry), def.clone())))
        .collect()
}

async fn emit_loop(registry: Arc<MetricRegistry>, def: MetricDef) {
    let key = def.series_key();
    let policy = def.policy();
    tracing::info!(
        series = %key,
        kind = def.kind.as_str(),
        interval_ms = def.interval.as_millis() as u64,
        "starting emission loop"
    );
    let producer: GaugeProducer = Arc::new(move || policy.sample());
    loop {
        let obs = match def.kind {
            MetricKind::Gauge => Observation::Producer(Arc::clone(&producer)),
            _ => Observation::Value(policy.sample()),
        };
        registry.record(&key, def.kind, obs);
        tokio::time::sleep(def.interval).await;
    }
}
