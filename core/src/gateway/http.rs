//! HTTP client for the scoring service.

use super::PredictionGateway;
use crate::{
    config::GatewayConfig,
    error::{ChurnError, ChurnResult},
    prediction::{validate_drivers, DriverSet, ExplainResponse, PredictionOutcome},
    profile::CustomerProfile,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Scoring service client. The configured timeout bounds every call,
/// so a hung service surfaces as a gateway error instead of a stuck
/// workflow.
#[derive(Clone)]
pub struct HttpGateway {
    client:   Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> ChurnResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ChurnError::gateway(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, profile: &CustomerProfile) -> ChurnResult<String> {
        let resp = self
            .client
            .post(self.url(path))
            .json(profile)
            .send()
            .await
            .map_err(|e| ChurnError::gateway(format!("POST {path} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ChurnError::gateway(format!("POST {path} returned {status}")));
        }

        resp.text()
            .await
            .map_err(|e| ChurnError::gateway(format!("POST {path} body unreadable: {e}")))
    }
}

#[async_trait]
impl PredictionGateway for HttpGateway {
    fn name(&self) -> &'static str { "http" }

    async fn predict(&self, profile: &CustomerProfile) -> ChurnResult<PredictionOutcome> {
        let body = self.post("/predict", profile).await?;
        decode_predict(&body)
    }

    async fn explain(&self, profile: &CustomerProfile) -> ChurnResult<DriverSet> {
        let body = self.post("/explain", profile).await?;
        decode_explain(&body)
    }
}

pub(crate) fn decode_predict(body: &str) -> ChurnResult<PredictionOutcome> {
    let outcome: PredictionOutcome = serde_json::from_str(body)
        .map_err(|e| ChurnError::gateway(format!("malformed /predict body: {e}")))?;
    outcome.validate()?;
    Ok(outcome)
}

pub(crate) fn decode_explain(body: &str) -> ChurnResult<DriverSet> {
    let resp: ExplainResponse = serde_json::from_str(body)
        .map_err(|e| ChurnError::gateway(format!("malformed /explain body: {e}")))?;
    validate_drivers(&resp.top_drivers)?;
    Ok(resp.top_drivers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_body_preserves_service_order() {
        let body = r#"{"top_drivers": [
            {"feature": "Contract", "value": "Month-to-month", "impact": 0.31},
            {"feature": "tenure", "value": 2, "impact": -0.12},
            {"feature": "InternetService", "value": "Fiber optic", "impact": 0.05}
        ]}"#;

        let drivers = decode_explain(body).unwrap();
        let features: Vec<&str> = drivers.iter().map(|d| d.feature.as_str()).collect();
        assert_eq!(features, ["Contract", "tenure", "InternetService"]);
        assert_eq!(drivers[1].value, serde_json::json!(2));
        assert!(!drivers[1].increases_risk());
    }

    #[test]
    fn missing_top_drivers_is_a_gateway_error() {
        let err = decode_explain(r#"{"drivers": []}"#).unwrap_err();
        assert!(matches!(err, ChurnError::Gateway { .. }));
    }

    #[test]
    fn predict_body_must_be_json() {
        let err = decode_predict("<html>502</html>").unwrap_err();
        assert!(err.to_string().contains("/predict"));
    }

    #[test]
    fn predict_body_range_is_checked() {
        assert!(decode_predict(r#"{"probability": 1.7}"#).is_err());
        assert_eq!(decode_predict(r#"{"probability": 0.25}"#).unwrap().probability, 0.25);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let gateway = HttpGateway::new(&GatewayConfig {
            base_url:   "http://scoring:8000/".to_string(),
            timeout_ms: 1_000,
        })
        .unwrap();
        assert_eq!(gateway.url("/predict"), "http://scoring:8000/predict");
    }
}
