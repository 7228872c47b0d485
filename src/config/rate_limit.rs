use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Rate limit configuration for the API.
///
/// The limiter itself is stock `tower_governor`; this type only carries the
/// knobs and builds the governor config.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Replenish rate in requests per second.
    pub per_second: u64,
    /// Burst size per client IP.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 2,
            burst_size: 30,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            per_second: std::env::var("RATE_LIMIT_PER_SECOND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            burst_size: std::env::var("RATE_LIMIT_BURST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn governor_config(
        &self,
    ) -> GovernorConfig<PeerIpKeyExtractor, ::governor::middleware::NoOpMiddleware> {
        GovernorConfigBuilder::default()
            .per_second(self.per_second)
            .burst_size(self.burst_size)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("Failed to build rate limiter config")
    }
}
