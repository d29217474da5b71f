//! Prediction gateway: the boundary to the external scoring service.
//!
//! RULE: A gateway holds no state between calls and never retries.
//! Every failure (transport, non-2xx status, undecodable or
//! out-of-range body) comes back as ChurnError::Gateway. Retrying is
//! the user's decision, made through the workflow.

pub mod http;
pub mod seeded;

pub use http::HttpGateway;
pub use seeded::SeededGateway;

use crate::{
    error::ChurnResult,
    prediction::{DriverSet, PredictionOutcome},
    profile::CustomerProfile,
};
use async_trait::async_trait;

/// The contract every scoring backend must fulfil.
#[async_trait]
pub trait PredictionGateway: Send + Sync {
    /// Stable name, used in logs.
    fn name(&self) -> &'static str;

    /// POST /predict: churn probability and optional label.
    async fn predict(&self, profile: &CustomerProfile) -> ChurnResult<PredictionOutcome>;

    /// POST /explain: contributing factors, ranked by |impact| descending.
    async fn explain(&self, profile: &CustomerProfile) -> ChurnResult<DriverSet>;
}
