//! Snapshot push exporter.
//!
//! Ships the rendered exposition snapshot to a remote ingestion endpoint on
//! a fixed interval, with the configured default labels merged into every
//! series. A failed push is logged and the next tick resends the current
//! cumulative state. The target URL is validated up front so a bad push
//! config fails at startup rather than on the first tick.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use metricforge_core::error::{ForgeError, Result};
use metricforge_core::{LabelSet, MetricRegistry};

use crate::config::AgentConfig;

/// Request timeout for one push attempt.
const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport boundary for shipping one rendered snapshot.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn ship(&self, body: String) -> Result<()>;
}

/// HTTP sink POSTing snapshots in the plain-text exposition format.
pub struct HttpSink {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpSink {
    pub fn new(url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| ForgeError::Push(format!("invalid push url {:?}: {}", url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(PUSH_TIMEOUT)
            .build()
            .map_err(|e| ForgeError::Push(format!("http client: {}", e)))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl SnapshotSink for HttpSink {
    async fn ship(&self, body: String) -> Result<()> {
        let resp = self
            .client
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| ForgeError::Push(format!("send failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(ForgeError::Push(format!("remote returned {}", resp.status())));
        }
        Ok(())
    }
}

/// Background exporter driving a `SnapshotSink` on a fixed interval.
pub struct Pusher {
    registry: Arc<MetricRegistry>,
    sink: Arc<dyn SnapshotSink>,
    default_labels: LabelSet,
    interval: Duration,
}

impl Pusher {
    pub fn new(
        registry: Arc<MetricRegistry>,
        sink: Arc<dyn SnapshotSink>,
        default_labels: LabelSet,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            sink,
            default_labels,
            interval,
        }
    }

    /// Build the production pusher from config; fails fast on a bad URL.
    pub fn from_config(cfg: &AgentConfig, registry: Arc<MetricRegistry>) -> Result<Self> {
        let sink = HttpSink::new(&cfg.push_url)?;
        Ok(Self::new(
            registry,
            Arc::new(sink),
            cfg.default_labels.clone(),
            cfg.push_interval,
        ))
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            "starting push loop"
        );
        loop {
            tokio::time::sleep(self.interval).await;
            let body = self.registry.render_with(&self.default_labels);
            if let Err(e) = self.sink.ship(body).await {
                tracing::warn!(error = %e, "push failed, keeping snapshot for next tick");
            }
        }
    }
}
