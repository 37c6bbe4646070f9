use std::env;
use std::sync::Arc;

use auction_engine::{
    BidAdmission, EngineConfig, LifecycleManager, MemoryStore, Sweeper, SystemClock,
};
use auction_engine::store::AuctionStore;
use event_broker::EventBroker;

use crate::rate_limit::RateLimiter;

/// Shared application state: every engine component is constructed
/// here and injected, never reached through ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub admission: Arc<BidAdmission>,
    pub lifecycle: Arc<LifecycleManager>,
    pub broker: Arc<EventBroker>,
    pub store: Arc<dyn AuctionStore>,
    pub rate_limiter: Arc<RateLimiter>,
    /// HMAC secret for bearer-token verification
    pub jwt_secret: Arc<String>,
}

impl AppState {
    /// Wire up the engine against the in-memory store.
    ///
    /// Returns the state plus the sweeper, which the caller spawns so
    /// process composition owns the background task.
    pub fn assemble(config: EngineConfig) -> (Self, Sweeper) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(SystemClock::new());
        let broker = Arc::new(EventBroker::with_defaults());

        let admission = Arc::new(BidAdmission::new(
            store.clone(),
            store.clone(),
            broker.clone(),
            clock.clone(),
            config.clone(),
        ));
        let lifecycle = Arc::new(LifecycleManager::new(store.clone(), broker.clone(), clock));
        let sweeper = Sweeper::new(lifecycle.clone(), &config);

        let jwt_secret =
            env::var("GATEWAY_JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string());

        let state = Self {
            admission,
            lifecycle,
            broker,
            store,
            rate_limiter: Arc::new(RateLimiter::new()),
            jwt_secret: Arc::new(jwt_secret),
        };
        (state, sweeper)
    }
}
