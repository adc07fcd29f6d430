//! Agent config loader (strict parsing).

pub mod duration;
pub mod schema;

use std::fs;

use metricforge_core::error::{ForgeError, Result};

pub use schema::{AgentConfig, MetricDef, RandomRange};

/// Fallback path when `CONFIG_FILE_NAME` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "./default_config.yml";

/// Resolve the config path from `CONFIG_FILE_NAME` and load it.
pub fn load_from_env() -> Result<AgentConfig> {
    let path = match std::env::var("CONFIG_FILE_NAME") {
        Ok(p) if !p.is_empty() => p,
        _ => {
            tracing::info!(
                path = DEFAULT_CONFIG_PATH,
                "config file not provided, falling back to default path"
            );
            DEFAULT_CONFIG_PATH.to_string()
        }
    };
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AgentConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ForgeError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AgentConfig> {
    let mut cfg: AgentConfig = serde_yaml::from_str(s)
        .map_err(|e| ForgeError::Config(format!("invalid yaml: {e}")))?;
    cfg.apply_fallbacks();
    cfg.validate()?;
    Ok(cfg)
}
