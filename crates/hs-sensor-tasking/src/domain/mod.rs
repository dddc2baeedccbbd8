//! Domain Layer
//!
//! Pure values and rules, no I/O:
//! - `TaskingConfig`: configuration with validation
//! - `SubscriptionSet`: distinct, ordered broadcast grants for one sensor
//! - `Exchange`: request/reply pairing shared by tasking and pre-check
//! - `DownstreamOutcome` / `Disposition`: tagged results of the state machine

pub mod config;
pub mod exchange;
pub mod subscription;

pub use config::{
    TaskingConfig, OUTCOME_CACHE_TTL, SENSOR_SUBSCRIPTIONS_PREFIX, SUBSCRIPTION_TTL,
};
pub use exchange::{
    Disposition, DownstreamOutcome, Exchange, OrchestrationState, Tasking, TaskingPreCheck,
};
pub use subscription::SubscriptionSet;
