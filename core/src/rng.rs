//! Deterministic random number generation for the offline gateway.
//!
//! RULE: Nothing in the crate may call any platform RNG.
//! The offline gateway derives one stream per (seed, profile, stream
//! slot), so the same profile always produces the same draws and
//! predict/explain never share a stream.

use crate::{error::ChurnResult, profile::CustomerProfile};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// Stable stream slots. NEVER reorder; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Predict = 0,
    Explain = 1,
}

pub struct GatewayRng {
    inner: Pcg64Mcg,
}

impl GatewayRng {
    pub fn new(master_seed: u64, stream: u64) -> Self {
        let derived_seed = master_seed ^ (stream.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Stream keyed on the profile's wire encoding.
    pub fn for_profile(
        master_seed: u64,
        profile: &CustomerProfile,
        slot: StreamSlot,
    ) -> ChurnResult<Self> {
        let bytes = serde_json::to_vec(profile)?;
        let keyed = master_seed ^ fnv1a(&bytes);
        Ok(Self::new(keyed, slot as u64))
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a float in [-magnitude, magnitude).
    pub fn signed(&mut self, magnitude: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * magnitude
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}
