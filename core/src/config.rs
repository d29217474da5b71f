use crate::error::{ChurnError, ChurnResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskThresholds {
    /// Applied only when the scoring service omits its own label.
    #[serde(default = "default_churn_threshold")]
    pub churn_threshold: f64,
    #[serde(default = "default_high_risk_threshold")]
    pub high_risk_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub thresholds: RiskThresholds,
    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,
}

fn default_timeout_ms() -> u64 { 10_000 }
fn default_churn_threshold() -> f64 { 0.5 }
fn default_high_risk_threshold() -> f64 { 0.7 }
fn default_event_log_capacity() -> usize { 256 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url:   "http://127.0.0.1:8000".to_string(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            churn_threshold:     default_churn_threshold(),
            high_risk_threshold: default_high_risk_threshold(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gateway:            GatewayConfig::default(),
            thresholds:         RiskThresholds::default(),
            event_log_capacity: default_event_log_capacity(),
        }
    }
}

impl SessionConfig {
    /// Load from a JSON config file.
    /// In tests, use SessionConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SessionConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate().map_err(|e| anyhow::anyhow!("{path}: {e}"))?;
        Ok(config)
    }

    /// Minimal in-code config for tests. Points the gateway at a
    /// loopback address nothing listens on and keeps a short timeout.
    pub fn default_test() -> Self {
        Self {
            gateway: GatewayConfig {
                base_url:   "http://127.0.0.1:9".to_string(),
                timeout_ms: 500,
            },
            thresholds:         RiskThresholds::default(),
            event_log_capacity: 64,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.gateway.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> ChurnResult<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("churn_threshold", t.churn_threshold),
            ("high_risk_threshold", t.high_risk_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ChurnError::Config(format!(
                    "thresholds.{name}={value} must be within [0, 1]"
                )));
            }
        }
        if self.gateway.base_url.trim().is_empty() {
            return Err(ChurnError::Config("gateway.base_url must not be empty".into()));
        }
        if self.gateway.timeout_ms == 0 {
            return Err(ChurnError::Config("gateway.timeout_ms must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let json = r#"{ "gateway": { "base_url": "http://scoring:8000" } }"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.gateway.base_url, "http://scoring:8000");
        assert_eq!(config.gateway.timeout_ms, 10_000);
        assert_eq!(config.thresholds.churn_threshold, 0.5);
        assert_eq!(config.thresholds.high_risk_threshold, 0.7);
        assert_eq!(config.event_log_capacity, 256);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = SessionConfig::default();
        config.thresholds.high_risk_threshold = 1.5;
        match config.validate() {
            Err(ChurnError::Config(msg)) => assert!(msg.contains("high_risk_threshold")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = SessionConfig::default_test();
        config.gateway.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ChurnError::Config(_))));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = SessionConfig::load("/nonexistent/churn.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/churn.json"));
    }
}
