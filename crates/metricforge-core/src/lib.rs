//! metricforge core: series identity, sampling policies, and the shared registry.
//!
//! This crate defines the aggregation engine shared by the agent binary and
//! tests: canonical label sets, value-generation policies, and the
//! concurrency-safe registry that renders exposition snapshots. It
//! intentionally carries no transport or runtime dependencies so it can be
//! reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ForgeError`/`Result` so a generator
//! process with dozens of live emission loops does not crash on one bad value.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod labels;
pub mod registry;
pub mod sample;

/// Shared result type.
pub use error::{ForgeError, Result};
pub use labels::LabelSet;
pub use registry::{GaugeProducer, MetricKind, MetricRegistry, Observation, SeriesKey};
pub use sample::ValuePolicy;
