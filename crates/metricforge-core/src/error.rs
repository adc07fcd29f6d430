//! Shared error type across metricforge crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Unified error type used by core and the agent.
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("config: {0}")]
    Config(String),
    #[error("push: {0}")]
    Push(String),
}
