//! Availability port
//!
//! Queried before every run to decide whether the model service can be used.

use async_trait::async_trait;
use thinkstep_domain::Availability;

/// Reports whether the model service is reachable and enabled
#[async_trait]
pub trait AvailabilityPort: Send + Sync {
    async fn availability(&self) -> Availability;
}

/// Availability fixed at construction time
///
/// Used when the adapter has no way to probe the service, and in tests.
pub struct StaticAvailability(pub Availability);

impl StaticAvailability {
    pub fn available() -> Self {
        Self(Availability::Available)
    }
}

#[async_trait]
impl AvailabilityPort for StaticAvailability {
    async fn availability(&self) -> Availability {
        self.0
    }
}
