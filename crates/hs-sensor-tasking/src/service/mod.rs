//! Service Layer
//!
//! Application services that orchestrate domain logic and coordinate with
//! external dependencies via ports.

pub mod subscriptions;
pub mod tasking_service;

pub use subscriptions::SubscriptionCacheManager;
pub use tasking_service::TaskingService;
