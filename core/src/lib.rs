//! Churn Desk core: customer profile editing, baseline and what-if
//! churn predictions against an external scoring service, and the
//! analytics derived from prediction history.
//!
//! Data flow:
//!   profile edit -> resolver -> workflow (submit / simulate)
//!     -> gateway (external) -> workflow history -> analytics

pub mod analytics;
pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod prediction;
pub mod profile;
pub mod resolver;
pub mod rng;
pub mod snapshot;
pub mod types;
pub mod workflow;
