//! Top-level facade crate for metricforge.
//!
//! Re-exports core types and the agent library so users can depend on a single crate.

pub mod core {
    pub use metricforge_core::*;
}

pub mod agent {
    pub use metricforge_agent::*;
}
