//! Event payloads emitted by the engine
//!
//! Every state change that observers care about maps to one event on
//! one per-auction topic. Payloads carry the fields a client needs to
//! update its view without re-fetching; anything more is re-fetched
//! from the authoritative store on (re)connect.

use event_broker::{EventBroker, PublishReport, Topic};
use serde::{Deserialize, Serialize};
use tracing::error;
use types::ids::{AuctionId, BidId, UserId};
use types::money::Price;

/// State change notifications published on per-auction topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuctionEvent {
    /// A bid was admitted as the new high bid
    BidPlaced {
        auction_id: AuctionId,
        bid_id: BidId,
        bidder_id: UserId,
        amount: Price,
        placed_at: i64,
    },

    /// Price, leader, or deadline changed
    AuctionUpdated {
        auction_id: AuctionId,
        current_price: Price,
        leader_bid_id: Option<BidId>,
        end_time: i64,
    },

    /// The auction reached its terminal Ended state
    AuctionEnded {
        auction_id: AuctionId,
        /// None when the auction ended unsold (no bids, or reserve not met)
        winning_bid_id: Option<BidId>,
        final_price: Price,
    },

    /// The auction was withdrawn
    AuctionCancelled { auction_id: AuctionId, reason: String },
}

impl AuctionEvent {
    /// The auction this event concerns.
    pub fn auction_id(&self) -> AuctionId {
        match self {
            AuctionEvent::BidPlaced { auction_id, .. }
            | AuctionEvent::AuctionUpdated { auction_id, .. }
            | AuctionEvent::AuctionEnded { auction_id, .. }
            | AuctionEvent::AuctionCancelled { auction_id, .. } => *auction_id,
        }
    }

    /// Topic this event publishes on.
    pub fn topic(&self) -> Topic {
        let auction_id = self.auction_id();
        match self {
            AuctionEvent::BidPlaced { .. } => Topic::BidPlaced { auction_id },
            AuctionEvent::AuctionUpdated { .. } => Topic::AuctionUpdated { auction_id },
            AuctionEvent::AuctionEnded { .. } => Topic::AuctionEnded { auction_id },
            AuctionEvent::AuctionCancelled { .. } => Topic::AuctionCancelled { auction_id },
        }
    }

    /// Event type string for wire frames and logging.
    pub fn event_type_label(&self) -> &'static str {
        match self {
            AuctionEvent::BidPlaced { .. } => "bid_placed",
            AuctionEvent::AuctionUpdated { .. } => "auction_updated",
            AuctionEvent::AuctionEnded { .. } => "auction_ended",
            AuctionEvent::AuctionCancelled { .. } => "auction_cancelled",
        }
    }
}

/// Publish an engine event on its topic.
///
/// Best-effort: delivery failures are the broker's concern and a
/// serialization failure is logged, never propagated: an admitted bid
/// must not be rolled back because a notification could not be built.
pub fn publish(broker: &EventBroker, event: &AuctionEvent, published_at: i64) -> Option<PublishReport> {
    match serde_json::to_value(event) {
        Ok(payload) => Some(broker.publish(
            &event.topic(),
            event.event_type_label(),
            payload,
            published_at,
        )),
        Err(err) => {
            error!(
                event_type = event.event_type_label(),
                auction_id = %event.auction_id(),
                error = %err,
                "failed to serialize event payload"
            );
            None
        }
    }
}
