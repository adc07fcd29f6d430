use std::time::Duration;

use serde::Deserialize;

use metricforge_core::error::{ForgeError, Result};
use metricforge_core::{LabelSet, MetricKind, SeriesKey, ValuePolicy};

use super::duration::de_duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_push_url")]
    pub push_url: String,

    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub default_labels: LabelSet,

    #[serde(default = "default_push_interval", deserialize_with = "de_duration")]
    pub push_interval: Duration,

    #[serde(default)]
    pub metrics: Vec<MetricDef>,
}

impl AgentConfig {
    /// Fold explicit zero/empty values back to the documented defaults.
    pub fn apply_fallbacks(&mut self) {
        if self.push_url.is_empty() {
            self.push_url = default_push_url();
        }
        if self.port == 0 {
            self.port = default_port();
        }
        if self.push_interval.is_zero() {
            self.push_interval = default_push_interval();
        }
    }

    pub fn validate(&self) -> Result<()> {
        for m in &self.metrics {
            m.validate()?;
        }
        Ok(())
    }

    /// `host:port` to bind; an empty host means all interfaces.
    pub fn listen_addr(&self) -> String {
        let host = if self.host.is_empty() {
            "0.0.0.0"
        } else {
            self.host.as_str()
        };
        format!("{}:{}", host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricDef {
    #[serde(rename = "type", default)]
    pub kind: MetricKind,

    pub name: String,

    #[serde(default)]
    pub labels: LabelSet,

    #[serde(default)]
    pub value: i64,

    #[serde(default, deserialize_with = "de_duration")]
    pub interval: Duration,

    #[serde(default)]
    pub random_value: Option<RandomRange>,
}

impl MetricDef {
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ForgeError::Config("metric name must not be empty".into()));
        }
        if self.interval.is_zero() {
            tracing::warn!(metric = %self.name, "interval is zero, emission loop will busy-spin");
        }
        if let Some(range) = &self.random_value {
            if !range.min.is_finite() || !range.max.is_finite() {
                return Err(ForgeError::Config(format!(
                    "metric {:?}: random_value bounds must be finite",
                    self.name
                )));
            }
            if range.min > range.max {
                tracing::warn!(
                    metric = %self.name,
                    min = range.min,
                    max = range.max,
                    "random_value.min exceeds max, samples pin to min"
                );
            }
        }
        Ok(())
    }

    /// The value policy this definition declares: the random range when
    /// present, the fixed value otherwise.
    pub fn policy(&self) -> ValuePolicy {
        match &self.random_value {
            Some(range) => ValuePolicy::Uniform {
                min: range.min,
                max: range.max,
            },
            None => ValuePolicy::Fixed(self.value),
        }
    }

    /// Series identity, computed once per emission loop.
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(self.name.clone(), self.labels.clone())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomRange {
    pub min: f64,
    pub max: f64,
}

fn default_push_url() -> String {
    "http://localhost:8428/api/v1/import/prometheus".into()
}
fn default_port() -> u16 {
    8080
}
fn default_push_interval() -> Duration {
    Duration::from_secs(10)
}
