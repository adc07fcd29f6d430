//! metricforge agent library entry.
//!
//! This crate wires configuration, the per-metric emission scheduler, the
//! push exporter, and the HTTP exposition surface into a runnable generator.
//! It is intended to be consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod ops;
pub mod push;
pub mod router;
pub mod scheduler;
