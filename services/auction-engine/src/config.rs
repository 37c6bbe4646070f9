//! Engine configuration
//!
//! The anti-snipe window and the bid retry bound are policy parameters,
//! injected rather than hard-coded, so operators can tune them without
//! touching the engine.

/// Configuration for the bidding engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Closing window: a bid admitted within this many nanoseconds of
    /// the deadline extends the deadline by the same window.
    pub anti_snipe_window_nanos: i64,
    /// Bounded optimistic retries per bid before reporting contention.
    pub max_bid_retries: u32,
    /// Interval between expiry sweeps.
    pub sweep_interval_nanos: i64,
    /// Upper bound on page size for ledger reads.
    pub max_page_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anti_snipe_window_nanos: 30 * 1_000_000_000,
            max_bid_retries: 8,
            sweep_interval_nanos: 1_000_000_000,
            max_page_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.anti_snipe_window_nanos, 30_000_000_000);
        assert!(config.max_bid_retries > 0);
        assert!(config.max_page_limit > 0);
    }
}
