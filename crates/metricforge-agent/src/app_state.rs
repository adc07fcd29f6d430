//! Shared application state for the metricforge agent.

use std::sync::Arc;

use metricforge_core::MetricRegistry;

use crate::config::AgentConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: AgentConfig,
    registry: Arc<MetricRegistry>,
}

impl AppState {
    pub fn new(cfg: AgentConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry: Arc::new(MetricRegistry::new()),
            }),
        }
    }

    pub fn cfg(&self) -> &AgentConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.inner.registry)
    }
}
