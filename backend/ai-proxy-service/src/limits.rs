//! Per-endpoint request budgets
//!
//! Window sizes vary with endpoint cost: generation-heavy endpoints admit
//! fewer calls per minute than text completion. Counters are process-local;
//! the rate-limit crate's trait seam is where a shared backend would plug in.

use rate_limit::{RateLimiter, SlidingWindowLimiter};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;

const WINDOW: Duration = Duration::from_secs(60);

/// (endpoint, max requests per window)
const BUDGETS: [(&str, u32); 10] = [
    ("chat", 20),
    ("generate-image", 10),
    ("generate-quiz", 10),
    ("generate-document", 10),
    ("generate-code", 20),
    ("discover", 20),
    ("web-search", 20),
    ("ai-suggest", 20),
    ("voice-transcribe", 10),
    ("process-document", 10),
];

pub struct EndpointLimits {
    limiters: HashMap<&'static str, SlidingWindowLimiter>,
}

impl EndpointLimits {
    pub fn new() -> Self {
        let limiters = BUDGETS
            .iter()
            .map(|(name, max)| (*name, SlidingWindowLimiter::new(*max, WINDOW)))
            .collect();
        Self { limiters }
    }

    /// Admit or reject one call for this user on this endpoint.
    pub fn check(&self, endpoint: &str, user_id: Uuid) -> Result<(), AppError> {
        let limiter = self
            .limiters
            .get(endpoint)
            .ok_or_else(|| AppError::Config(format!("no budget for endpoint {endpoint}")))?;
        if limiter.check(&user_id.to_string()).is_allowed() {
            Ok(())
        } else {
            crate::metrics::RATE_LIMITED.inc();
            Err(AppError::RateLimited)
        }
    }
}

impl Default for EndpointLimits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_endpoint_has_a_budget() {
        let limits = EndpointLimits::new();
        let user = Uuid::new_v4();
        for (endpoint, _) in BUDGETS {
            assert!(limits.check(endpoint, user).is_ok());
        }
    }

    #[test]
    fn budget_exhaustion_returns_rate_limited() {
        let limits = EndpointLimits::new();
        let user = Uuid::new_v4();
        for _ in 0..10 {
            limits.check("generate-image", user).unwrap();
        }
        assert!(matches!(
            limits.check("generate-image", user),
            Err(AppError::RateLimited)
        ));
        // Other endpoints and other users are unaffected.
        assert!(limits.check("chat", user).is_ok());
        assert!(limits.check("generate-image", Uuid::new_v4()).is_ok());
    }

    #[test]
    fn unknown_endpoint_is_a_configuration_error() {
        let limits = EndpointLimits::new();
        assert!(matches!(
            limits.check("bogus", Uuid::new_v4()),
            Err(AppError::Config(_))
        ));
    }
}
