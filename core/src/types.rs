//! Shared primitive types used across the entire session.

/// A session tick. Every clock reading advances it by one, so a tick
/// is a monotonic creation instant, not a unit of wall-clock time.
pub type Tick = u64;

/// Identifier of one in-flight gateway request pair.
pub type RequestId = u64;

/// A stable, unique identifier for a recorded prediction.
pub type PredictionId = String;
