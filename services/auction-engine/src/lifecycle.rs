//! Auction lifecycle manager
//!
//! Owns every status transition: explicit seller/admin actions and the
//! time-driven expiry sweep. Transitions use the same versioned
//! compare-and-set discipline as bid admission, so a last-instant bid
//! (with its anti-snipe extension) and the sweep cannot race into an
//! inconsistent terminal state: whichever commits first bumps the
//! version and the loser re-reads.

use std::sync::Arc;

use event_broker::EventBroker;
use tracing::{debug, info, warn};
use types::auction::{Auction, AuctionStatus};
use types::errors::{LifecycleError, StoreError};
use types::ids::{AuctionId, BidId};
use types::money::Price;
use types::principal::Principal;

use crate::clock::Clock;
use crate::events::{self, AuctionEvent};
use crate::store::{AuctionStore, AuctionUpdate};

/// Parameters for creating a new auction.
#[derive(Debug, Clone)]
pub struct CreateAuction {
    pub title: String,
    pub description: String,
    pub starting_price: Price,
    pub reserve_price: Option<Price>,
    pub bid_increment: Price,
    pub start_time: i64,
    pub end_time: i64,
}

/// Outcome of one sweep cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Auctions the work list returned
    pub examined: usize,
    /// Transitioned to Ended this cycle
    pub ended: usize,
    /// No longer due (extended deadline, already terminal, lost race)
    pub skipped: usize,
    /// Store failures, retried next cycle
    pub failed: usize,
}

/// Drives auctions through draft → scheduled → active → ended/cancelled.
pub struct LifecycleManager {
    store: Arc<dyn AuctionStore>,
    broker: Arc<EventBroker>,
    clock: Arc<dyn Clock>,
}

impl LifecycleManager {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        broker: Arc<EventBroker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            broker,
            clock,
        }
    }

    /// Create a draft auction owned by the calling seller.
    pub async fn create(
        &self,
        principal: &Principal,
        params: CreateAuction,
    ) -> Result<Auction, LifecycleError> {
        if params.end_time <= params.start_time {
            return Err(LifecycleError::InvalidParameters {
                reason: "end time must be after start time".to_string(),
            });
        }
        if params.bid_increment.is_zero() {
            return Err(LifecycleError::InvalidParameters {
                reason: "bid increment must be positive".to_string(),
            });
        }

        let now = self.clock.now();
        let auction = Auction::new(
            principal.id,
            params.title,
            params.description,
            params.starting_price,
            params.reserve_price,
            params.bid_increment,
            params.start_time,
            params.end_time,
            now,
        );
        self.store.insert(auction.clone()).await?;

        info!(auction_id = %auction.auction_id, seller_id = %auction.seller_id, "auction created");
        Ok(auction)
    }

    /// Publish a draft with a future start: Draft → Scheduled.
    pub async fn schedule(
        &self,
        principal: &Principal,
        auction_id: AuctionId,
    ) -> Result<Auction, LifecycleError> {
        let auction = self.read_owned(principal, auction_id).await?;
        self.transition(&auction, AuctionStatus::Scheduled).await
    }

    /// Open for bidding: Draft/Scheduled → Active.
    ///
    /// Requires the start time to have passed unless `override_start`
    /// is set (an explicit seller choice to open early).
    pub async fn activate(
        &self,
        principal: &Principal,
        auction_id: AuctionId,
        override_start: bool,
    ) -> Result<Auction, LifecycleError> {
        let auction = self.read_owned(principal, auction_id).await?;

        let now = self.clock.now();
        if auction.start_time > now && !override_start {
            return Err(LifecycleError::InvalidTransition {
                from: auction.status,
                to: AuctionStatus::Active,
            });
        }

        self.transition(&auction, AuctionStatus::Active).await
    }

    /// Close early by explicit seller/admin action: Active → Ended.
    pub async fn end(
        &self,
        principal: &Principal,
        auction_id: AuctionId,
    ) -> Result<Auction, LifecycleError> {
        let auction = self.read_owned(principal, auction_id).await?;
        let ended = self.transition(&auction, AuctionStatus::Ended).await?;
        self.emit_ended(&ended);
        Ok(ended)
    }

    /// Withdraw an auction: → Cancelled.
    ///
    /// Permitted before any bid exists; once bids stand, only an admin
    /// may cancel; revoking a bidder's standing bid is never implicit.
    pub async fn cancel(
        &self,
        principal: &Principal,
        auction_id: AuctionId,
        reason: impl Into<String>,
    ) -> Result<Auction, LifecycleError> {
        let auction = self.read_owned(principal, auction_id).await?;

        if auction.has_bids() && !principal.is_admin() {
            return Err(LifecycleError::CancelWithBids {
                auction_id,
                bid_count: auction.bid_count,
            });
        }

        let cancelled = self.transition(&auction, AuctionStatus::Cancelled).await?;
        let now = self.clock.now();
        events::publish(
            &self.broker,
            &AuctionEvent::AuctionCancelled {
                auction_id,
                reason: reason.into(),
            },
            now,
        );
        Ok(cancelled)
    }

    /// One expiry pass: every Active auction whose deadline has passed
    /// transitions to Ended.
    ///
    /// Failures are isolated per auction: one broken record never
    /// blocks the rest of the cycle; the next cycle retries it.
    pub async fn sweep_expired(&self) -> Result<SweepReport, StoreError> {
        let due = self.store.active_expiring_before(self.clock.now()).await?;

        let mut report = SweepReport {
            examined: due.len(),
            ..SweepReport::default()
        };

        for auction_id in due {
            match self.sweep_one(auction_id).await {
                Ok(true) => report.ended += 1,
                Ok(false) => report.skipped += 1,
                Err(err) => {
                    warn!(
                        auction_id = %auction_id,
                        error = %err,
                        "sweep transition failed, retrying next cycle"
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Attempt to end one expired auction. Returns false when the
    /// auction turned out not to be due after all (extended deadline,
    /// already terminal, or it lost the race to a concurrent writer).
    async fn sweep_one(&self, auction_id: AuctionId) -> Result<bool, StoreError> {
        let Some(auction) = self.store.read(auction_id).await? else {
            return Ok(false);
        };

        let now = self.clock.now();
        // Re-check against the fresh read: an anti-snipe extension may
        // have moved the deadline since the work list was built.
        if auction.status != AuctionStatus::Active || auction.end_time > now {
            return Ok(false);
        }

        let update = AuctionUpdate::at(now).status(AuctionStatus::Ended);
        match self
            .store
            .conditional_update(auction_id, auction.version, update)
            .await
        {
            Ok(ended) => {
                self.emit_ended(&ended);
                Ok(true)
            }
            Err(StoreError::VersionConflict) => {
                // A bid slipped in; its extension (or another sweep)
                // wins and the next cycle re-evaluates.
                debug!(auction_id = %auction_id, "sweep lost race, deferring");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Winner of an ended auction: the leader, unless a reserve price
    /// was set and never met, in which case the auction ends unsold.
    pub fn winner_of(auction: &Auction) -> Option<BidId> {
        let leader = auction.leader_bid_id?;
        if let Some(reserve) = auction.reserve_price {
            if auction.current_price < reserve {
                return None;
            }
        }
        Some(leader)
    }

    fn emit_ended(&self, auction: &Auction) {
        let winning_bid_id = Self::winner_of(auction);
        info!(
            auction_id = %auction.auction_id,
            winner = winning_bid_id.map(|id| id.to_string()).unwrap_or_else(|| "none".to_string()),
            final_price = %auction.current_price,
            "auction ended"
        );
        events::publish(
            &self.broker,
            &AuctionEvent::AuctionEnded {
                auction_id: auction.auction_id,
                winning_bid_id,
                final_price: auction.current_price,
            },
            self.clock.now(),
        );
    }

    /// Fetch an auction and verify the caller may manage it.
    async fn read_owned(
        &self,
        principal: &Principal,
        auction_id: AuctionId,
    ) -> Result<Auction, LifecycleError> {
        let auction = self
            .store
            .read(auction_id)
            .await?
            .ok_or(LifecycleError::AuctionNotFound { auction_id })?;

        if auction.seller_id != principal.id && !principal.is_admin() {
            return Err(LifecycleError::NotPermitted);
        }
        Ok(auction)
    }

    /// Apply a status transition through the state machine, CAS-guarded.
    async fn transition(
        &self,
        auction: &Auction,
        to: AuctionStatus,
    ) -> Result<Auction, LifecycleError> {
        if !auction.status.can_transition_to(to) {
            return Err(LifecycleError::InvalidTransition {
                from: auction.status,
                to,
            });
        }

        let now = self.clock.now();
        let update = AuctionUpdate::at(now).status(to);
        match self
            .store
            .conditional_update(auction.auction_id, auction.version, update)
            .await
        {
            Ok(updated) => {
                info!(
                    auction_id = %auction.auction_id,
                    from = %auction.status,
                    to = %to,
                    "auction transitioned"
                );
                Ok(updated)
            }
            Err(StoreError::VersionConflict) => Err(LifecycleError::Contention {
                auction_id: auction.auction_id,
            }),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use types::ids::UserId;

    const T0: i64 = 1708123456789000000;
    const HOUR: i64 = 3_600_000_000_000;

    struct Fixture {
        lifecycle: LifecycleManager,
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        broker: Arc<EventBroker>,
        seller: Principal,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let broker = Arc::new(EventBroker::with_defaults());
        let lifecycle = LifecycleManager::new(store.clone(), broker.clone(), clock.clone());
        Fixture {
            lifecycle,
            store,
            clock,
            broker,
            seller: Principal::user(UserId::new()),
        }
    }

    fn params() -> CreateAuction {
        CreateAuction {
            title: "Road bike".to_string(),
            description: "54cm frame".to_string(),
            starting_price: Price::from_u64(100),
            reserve_price: None,
            bid_increment: Price::from_u64(10),
            start_time: T0,
            end_time: T0 + HOUR,
        }
    }

    async fn active_auction(fx: &Fixture) -> Auction {
        let auction = fx.lifecycle.create(&fx.seller, params()).await.unwrap();
        fx.lifecycle
            .activate(&fx.seller, auction.auction_id, false)
            .await
            .unwrap()
    }

    /// Record a bid the way admission would: CAS price/leader/count.
    async fn admit_bid(fx: &Fixture, auction: &Auction, amount: u64) -> BidId {
        let bid_id = BidId::new();
        let update = AuctionUpdate {
            current_price: Some(Price::from_u64(amount)),
            leader_bid_id: Some(bid_id),
            end_time: None,
            status: None,
            bid_count: Some(auction.bid_count + 1),
            updated_at: fx.clock.now(),
        };
        fx.store
            .conditional_update(auction.auction_id, auction.version, update)
            .await
            .unwrap();
        bid_id
    }

    #[tokio::test]
    async fn test_create_validates_parameters() {
        let fx = fixture();

        let mut bad = params();
        bad.end_time = bad.start_time;
        let err = fx.lifecycle.create(&fx.seller, bad).await.unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidParameters { .. }));

        let mut bad = params();
        bad.bid_increment = Price::zero();
        let err = fx.lifecycle.create(&fx.seller, bad).await.unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidParameters { .. }));
    }

    #[tokio::test]
    async fn test_draft_schedule_activate_flow() {
        let fx = fixture();
        let auction = fx.lifecycle.create(&fx.seller, params()).await.unwrap();
        assert_eq!(auction.status, AuctionStatus::Draft);

        let scheduled = fx
            .lifecycle
            .schedule(&fx.seller, auction.auction_id)
            .await
            .unwrap();
        assert_eq!(scheduled.status, AuctionStatus::Scheduled);

        let active = fx
            .lifecycle
            .activate(&fx.seller, auction.auction_id, false)
            .await
            .unwrap();
        assert_eq!(active.status, AuctionStatus::Active);
    }

    #[tokio::test]
    async fn test_activate_before_start_requires_override() {
        let fx = fixture();
        let mut future = params();
        future.start_time = T0 + HOUR;
        future.end_time = T0 + 2 * HOUR;
        let auction = fx.lifecycle.create(&fx.seller, future).await.unwrap();

        let err = fx
            .lifecycle
            .activate(&fx.seller, auction.auction_id, false)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: AuctionStatus::Draft,
                to: AuctionStatus::Active,
            }
        );

        let active = fx
            .lifecycle
            .activate(&fx.seller, auction.auction_id, true)
            .await
            .unwrap();
        assert_eq!(active.status, AuctionStatus::Active);
    }

    #[tokio::test]
    async fn test_illegal_transitions_are_reported() {
        let fx = fixture();
        let auction = active_auction(&fx).await;

        // Active → Scheduled is not a legal move
        let err = fx
            .lifecycle
            .schedule(&fx.seller, auction.auction_id)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: AuctionStatus::Active,
                to: AuctionStatus::Scheduled,
            }
        );

        // Ending twice fails the second time
        fx.lifecycle
            .end(&fx.seller, auction.auction_id)
            .await
            .unwrap();
        let err = fx
            .lifecycle
            .end(&fx.seller, auction.auction_id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_only_seller_or_admin_may_manage() {
        let fx = fixture();
        let auction = fx.lifecycle.create(&fx.seller, params()).await.unwrap();

        let stranger = Principal::user(UserId::new());
        let err = fx
            .lifecycle
            .activate(&stranger, auction.auction_id, false)
            .await
            .unwrap_err();
        assert_eq!(err, LifecycleError::NotPermitted);

        let admin = Principal::admin(UserId::new());
        fx.lifecycle
            .activate(&admin, auction.auction_id, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_pre_bid_succeeds_and_emits() {
        let fx = fixture();
        let auction = active_auction(&fx).await;

        let (observer, mut rx) = fx.broker.register();
        fx.broker
            .subscribe(
                observer,
                &event_broker::Topic::AuctionCancelled {
                    auction_id: auction.auction_id,
                },
            )
            .unwrap();

        let cancelled = fx
            .lifecycle
            .cancel(&fx.seller, auction.auction_id, "listed in error")
            .await
            .unwrap();
        assert_eq!(cancelled.status, AuctionStatus::Cancelled);

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event_type, "auction_cancelled");
        assert_eq!(envelope.payload["reason"], "listed in error");
    }

    #[tokio::test]
    async fn test_cancel_with_bids_rejected_for_seller() {
        let fx = fixture();
        let auction = active_auction(&fx).await;
        admit_bid(&fx, &auction, 100).await;

        let err = fx
            .lifecycle
            .cancel(&fx.seller, auction.auction_id, "changed my mind")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::CancelWithBids {
                auction_id: auction.auction_id,
                bid_count: 1,
            }
        );

        // Admin override is the one sanctioned path
        let admin = Principal::admin(UserId::new());
        let cancelled = fx
            .lifecycle
            .cancel(&admin, auction.auction_id, "fraud takedown")
            .await
            .unwrap();
        assert_eq!(cancelled.status, AuctionStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_end_names_leader_as_winner() {
        let fx = fixture();
        let auction = active_auction(&fx).await;
        let bid_id = admit_bid(&fx, &auction, 150).await;

        let (observer, mut rx) = fx.broker.register();
        fx.broker
            .subscribe(
                observer,
                &event_broker::Topic::AuctionEnded {
                    auction_id: auction.auction_id,
                },
            )
            .unwrap();

        fx.lifecycle
            .end(&fx.seller, auction.auction_id)
            .await
            .unwrap();

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.payload["winning_bid_id"], bid_id.to_string());
        assert_eq!(envelope.payload["final_price"], "150");
    }

    #[tokio::test]
    async fn test_reserve_not_met_ends_unsold() {
        let fx = fixture();
        let mut with_reserve = params();
        with_reserve.reserve_price = Some(Price::from_u64(500));
        let auction = fx.lifecycle.create(&fx.seller, with_reserve).await.unwrap();
        let auction = fx
            .lifecycle
            .activate(&fx.seller, auction.auction_id, false)
            .await
            .unwrap();
        admit_bid(&fx, &auction, 150).await;

        let ended = fx
            .lifecycle
            .end(&fx.seller, auction.auction_id)
            .await
            .unwrap();
        assert_eq!(LifecycleManager::winner_of(&ended), None);
    }

    #[tokio::test]
    async fn test_sweep_ends_due_auctions_only() {
        let fx = fixture();
        let due = active_auction(&fx).await;

        let mut later = params();
        later.end_time = T0 + 3 * HOUR;
        let running = fx.lifecycle.create(&fx.seller, later).await.unwrap();
        fx.lifecycle
            .activate(&fx.seller, running.auction_id, false)
            .await
            .unwrap();

        // Nothing due yet
        let report = fx.lifecycle.sweep_expired().await.unwrap();
        assert_eq!(report, SweepReport::default());

        // At the first deadline exactly
        fx.clock.set(T0 + HOUR);
        let report = fx.lifecycle.sweep_expired().await.unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.ended, 1);

        let swept = fx.store.read(due.auction_id).await.unwrap().unwrap();
        assert_eq!(swept.status, AuctionStatus::Ended);
        let still_running = fx.store.read(running.auction_id).await.unwrap().unwrap();
        assert_eq!(still_running.status, AuctionStatus::Active);
    }

    #[tokio::test]
    async fn test_sweep_respects_extended_deadline() {
        let fx = fixture();
        let auction = active_auction(&fx).await;

        // Simulate an anti-snipe extension committed after the work
        // list would have been built
        let update = AuctionUpdate {
            current_price: None,
            leader_bid_id: None,
            end_time: Some(T0 + 2 * HOUR),
            status: None,
            bid_count: None,
            updated_at: T0,
        };
        fx.store
            .conditional_update(auction.auction_id, auction.version, update)
            .await
            .unwrap();

        fx.clock.set(T0 + HOUR);
        let report = fx.lifecycle.sweep_expired().await.unwrap();
        assert_eq!(report.ended, 0);

        let read = fx.store.read(auction.auction_id).await.unwrap().unwrap();
        assert_eq!(read.status, AuctionStatus::Active);
    }
}
