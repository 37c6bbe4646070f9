//! Periodic expiry sweeper
//!
//! Owns the background task that closes time-expired auctions. Runs on
//! a fixed interval, never client-triggered. Each cycle is independent:
//! a failed cycle (or a failed auction within a cycle) is logged and
//! picked up again on the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::lifecycle::LifecycleManager;

/// Background driver for [`LifecycleManager::sweep_expired`].
pub struct Sweeper {
    lifecycle: Arc<LifecycleManager>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(lifecycle: Arc<LifecycleManager>, config: &EngineConfig) -> Self {
        Self {
            lifecycle,
            interval: Duration::from_nanos(config.sweep_interval_nanos.max(1) as u64),
        }
    }

    /// Run the sweep loop until the owning task is dropped.
    pub async fn run(self) {
        let mut ticker = time::interval(self.interval);
        // A stalled cycle should not cause a burst of catch-up sweeps
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_ms = self.interval.as_millis() as u64, "sweeper started");
        loop {
            ticker.tick().await;
            match self.lifecycle.sweep_expired().await {
                Ok(report) if report.examined > 0 => {
                    info!(
                        examined = report.examined,
                        ended = report.ended,
                        skipped = report.skipped,
                        failed = report.failed,
                        "sweep cycle complete"
                    );
                }
                Ok(_) => debug!("sweep cycle idle"),
                Err(err) => {
                    // Store outage: surface loudly, try again next tick
                    error!(error = %err, "sweep cycle failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::lifecycle::CreateAuction;
    use crate::store::{AuctionStore, MemoryStore};
    use event_broker::EventBroker;
    use types::auction::AuctionStatus;
    use types::money::Price;
    use types::principal::Principal;
    use types::ids::UserId;

    const T0: i64 = 1708123456789000000;
    const HOUR: i64 = 3_600_000_000_000;

    #[tokio::test]
    async fn test_sweeper_ends_expired_auction() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let broker = Arc::new(EventBroker::with_defaults());
        let config = EngineConfig {
            sweep_interval_nanos: 1_000_000, // 1ms ticks for the test
            ..EngineConfig::default()
        };
        let lifecycle = Arc::new(LifecycleManager::new(store.clone(), broker, clock.clone()));

        let seller = Principal::user(UserId::new());
        let auction = lifecycle
            .create(
                &seller,
                CreateAuction {
                    title: "Espresso machine".to_string(),
                    description: String::new(),
                    starting_price: Price::from_u64(100),
                    reserve_price: None,
                    bid_increment: Price::from_u64(10),
                    start_time: T0,
                    end_time: T0 + HOUR,
                },
            )
            .await
            .unwrap();
        lifecycle
            .activate(&seller, auction.auction_id, false)
            .await
            .unwrap();

        clock.set(T0 + HOUR);
        let handle = tokio::spawn(Sweeper::new(lifecycle, &config).run());

        // Wait for the sweeper to observe the expiry
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(2)).await;
            let read = store.read(auction.auction_id).await.unwrap().unwrap();
            if read.status == AuctionStatus::Ended {
                handle.abort();
                return;
            }
        }
        handle.abort();
        panic!("sweeper never ended the expired auction");
    }
}
