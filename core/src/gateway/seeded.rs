//! Offline gateway with deterministic, profile-keyed output.
//!
//! This is a stand-in for the scoring service, not a churn model: the
//! numbers are draws from a seeded stream. Same seed and same profile
//! always give the same probability and the same drivers.

use super::PredictionGateway;
use crate::{
    error::ChurnResult,
    prediction::{Driver, DriverSet, PredictionOutcome},
    profile::{CustomerProfile, FieldValue, ProfileField},
    rng::{GatewayRng, StreamSlot},
};
use async_trait::async_trait;

const MAX_IMPACT: f64 = 0.35;
const MIN_DRIVERS: u64 = 3;
const MAX_DRIVERS: u64 = 5;

pub struct SeededGateway {
    seed: u64,
}

impl SeededGateway {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl PredictionGateway for SeededGateway {
    fn name(&self) -> &'static str { "seeded" }

    async fn predict(&self, profile: &CustomerProfile) -> ChurnResult<PredictionOutcome> {
        let mut rng = GatewayRng::for_profile(self.seed, profile, StreamSlot::Predict)?;
        Ok(PredictionOutcome::new(rng.next_f64()))
    }

    async fn explain(&self, profile: &CustomerProfile) -> ChurnResult<DriverSet> {
        let mut rng = GatewayRng::for_profile(self.seed, profile, StreamSlot::Explain)?;

        let count = MIN_DRIVERS + rng.next_u64_below(MAX_DRIVERS - MIN_DRIVERS + 1);
        let mut pool: Vec<ProfileField> = ProfileField::ALL.to_vec();
        let mut drivers = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let pick = rng.next_u64_below(pool.len() as u64) as usize;
            let feature = pool.swap_remove(pick);
            let value = match profile.field_value(feature) {
                FieldValue::Number(n) => serde_json::json!(n),
                FieldValue::Text(s) => serde_json::json!(s),
            };
            drivers.push(Driver {
                feature: feature.as_str().to_string(),
                value,
                impact: rng.signed(MAX_IMPACT),
            });
        }

        drivers.sort_by(|a, b| {
            b.impact
                .abs()
                .partial_cmp(&a.impact.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(drivers)
    }
}
