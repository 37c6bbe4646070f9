//! Bid admission controller
//!
//! Decides whether a submitted bid becomes the new authoritative high
//! bid. The admission decision, the price/leader mutation, and the
//! anti-snipe deadline extension commit in a single versioned
//! compare-and-set against the store, then the bid is appended to the
//! ledger and the change fanned out. Two bids racing on one auction are
//! serialized by the CAS: the loser re-reads and re-validates against
//! the new floor, up to a bounded retry count.

use std::sync::Arc;

use event_broker::EventBroker;
use tracing::{debug, info, warn};
use types::bid::{Bid, BidStatus};
use types::errors::{BidError, StoreError};
use types::ids::AuctionId;
use types::money::Price;
use types::principal::Principal;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::events::{self, AuctionEvent};
use crate::store::{AuctionStore, AuctionUpdate, BidLedger};

/// A ledger entry together with its derived standing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BidView {
    #[serde(flatten)]
    pub bid: Bid,
    pub status: BidStatus,
}

/// Admits or rejects bids against the current auction state.
pub struct BidAdmission {
    store: Arc<dyn AuctionStore>,
    ledger: Arc<dyn BidLedger>,
    broker: Arc<EventBroker>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl BidAdmission {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        ledger: Arc<dyn BidLedger>,
        broker: Arc<EventBroker>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            broker,
            clock,
            config,
        }
    }

    /// Submit a bid on behalf of an authenticated principal.
    ///
    /// The bidder identity comes exclusively from the resolved
    /// principal; amounts below the floor, bids on closed auctions, and
    /// self-bids are rejected synchronously. Returns the admitted bid
    /// with its server-assigned timestamp.
    pub async fn place_bid(
        &self,
        principal: &Principal,
        auction_id: AuctionId,
        amount: Price,
        is_auto_bid: bool,
    ) -> Result<Bid, BidError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;

            let auction = self
                .store
                .read(auction_id)
                .await?
                .ok_or(BidError::AuctionNotFound { auction_id })?;
            let now = self.clock.now();

            // Both checks are required: the status can lag the sweep
            // and the sweep can lag the deadline.
            if !auction.is_open_at(now) {
                return Err(BidError::AuctionNotActive {
                    auction_id,
                    status: auction.status,
                });
            }
            if principal.id == auction.seller_id {
                return Err(BidError::SelfBidNotAllowed);
            }
            let floor = auction.min_acceptable_bid();
            if amount < floor {
                return Err(BidError::BidTooLow { amount, floor });
            }

            let bid = Bid::new(auction_id, principal.id, amount, now, is_auto_bid);

            // Anti-snipe: a bid landing inside the closing window pushes
            // the deadline out by the window, in the same atomic update
            // as the price change.
            let end_time = if auction.in_closing_window(now, self.config.anti_snipe_window_nanos) {
                Some(auction.end_time + self.config.anti_snipe_window_nanos)
            } else {
                None
            };

            let update = AuctionUpdate {
                current_price: Some(amount),
                leader_bid_id: Some(bid.bid_id),
                end_time,
                status: None,
                bid_count: Some(auction.bid_count + 1),
                updated_at: now,
            };

            match self
                .store
                .conditional_update(auction_id, auction.version, update)
                .await
            {
                Ok(updated) => {
                    self.ledger.append(bid.clone()).await?;

                    info!(
                        auction_id = %auction_id,
                        bid_id = %bid.bid_id,
                        amount = %amount,
                        attempts,
                        extended = end_time.is_some(),
                        "bid admitted"
                    );

                    events::publish(
                        &self.broker,
                        &AuctionEvent::BidPlaced {
                            auction_id,
                            bid_id: bid.bid_id,
                            bidder_id: bid.bidder_id,
                            amount: bid.amount,
                            placed_at: bid.placed_at,
                        },
                        now,
                    );
                    events::publish(
                        &self.broker,
                        &AuctionEvent::AuctionUpdated {
                            auction_id,
                            current_price: updated.current_price,
                            leader_bid_id: updated.leader_bid_id,
                            end_time: updated.end_time,
                        },
                        now,
                    );

                    return Ok(bid);
                }
                Err(StoreError::VersionConflict) => {
                    if attempts >= self.config.max_bid_retries {
                        warn!(
                            auction_id = %auction_id,
                            attempts,
                            "bid retry bound exhausted under contention"
                        );
                        return Err(BidError::Contention {
                            auction_id,
                            attempts,
                        });
                    }
                    debug!(auction_id = %auction_id, attempts, "lost bid race, re-reading");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Page through an auction's ledger with derived bid standings.
    pub async fn bids_for_auction(
        &self,
        auction_id: AuctionId,
        page: usize,
        limit: usize,
    ) -> Result<Vec<BidView>, BidError> {
        let auction = self
            .store
            .read(auction_id)
            .await?
            .ok_or(BidError::AuctionNotFound { auction_id })?;

        let limit = limit.clamp(1, self.config.max_page_limit);
        let bids = self.ledger.bids_for_auction(auction_id, page, limit).await?;

        Ok(bids
            .into_iter()
            .map(|bid| {
                let status = bid.status(&auction);
                BidView { bid, status }
            })
            .collect())
    }
}
