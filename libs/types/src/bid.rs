//! Bid record and derived bid status
//!
//! Bids are append-only: once admitted they are never mutated or
//! deleted. Their status (winning/outbid) is derived at read time from
//! the auction's leader reference, never stored, so there is no second
//! mutation path that could drift from the authoritative record.

use crate::auction::{Auction, AuctionStatus};
use crate::ids::{AuctionId, BidId, UserId};
use crate::money::Price;
use serde::{Deserialize, Serialize};

/// A single admitted bid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub bid_id: BidId,
    pub auction_id: AuctionId,
    pub bidder_id: UserId,
    pub amount: Price,
    /// Server-assigned admission timestamp (Unix nanos). Client-supplied
    /// timestamps are ignored.
    pub placed_at: i64,
    /// Placed by the proxy-bidding agent rather than the user directly
    pub is_auto_bid: bool,
}

impl Bid {
    /// Create a new bid with a fresh id
    pub fn new(
        auction_id: AuctionId,
        bidder_id: UserId,
        amount: Price,
        placed_at: i64,
        is_auto_bid: bool,
    ) -> Self {
        Self {
            bid_id: BidId::new(),
            auction_id,
            bidder_id,
            amount,
            placed_at,
            is_auto_bid,
        }
    }

    /// Derive this bid's status from the auction it belongs to
    pub fn status(&self, auction: &Auction) -> BidStatus {
        BidStatus::derive(self.bid_id, auction)
    }
}

/// Derived bid standing
///
/// Never persisted; recomputed from the auction's leader reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidStatus {
    /// The current high bid of an auction still open for bidding
    Active,
    /// Surpassed by a later bid
    Outbid,
    /// The high bid of an ended auction
    Winning,
}

impl BidStatus {
    /// Compute the status of `bid_id` relative to `auction`
    pub fn derive(bid_id: BidId, auction: &Auction) -> BidStatus {
        if auction.leader_bid_id == Some(bid_id) {
            if auction.status == AuctionStatus::Ended {
                BidStatus::Winning
            } else {
                BidStatus::Active
            }
        } else {
            BidStatus::Outbid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auction_with_leader(leader: Option<BidId>, status: AuctionStatus) -> Auction {
        let mut auction = Auction::new(
            UserId::new(),
            "Signed first edition",
            "",
            Price::from_u64(50),
            None,
            Price::from_u64(5),
            1708123456789000000,
            1708123456789000000 + 3_600_000_000_000,
            1708123456789000000,
        );
        auction.leader_bid_id = leader;
        auction.status = status;
        if leader.is_some() {
            auction.bid_count = 1;
        }
        auction
    }

    #[test]
    fn test_bid_creation() {
        let auction_id = AuctionId::new();
        let bid = Bid::new(
            auction_id,
            UserId::new(),
            Price::from_u64(55),
            1708123456790000000,
            false,
        );
        assert_eq!(bid.auction_id, auction_id);
        assert!(!bid.is_auto_bid);
    }

    #[test]
    fn test_leader_of_active_auction_is_active() {
        let bid_id = BidId::new();
        let auction = auction_with_leader(Some(bid_id), AuctionStatus::Active);
        assert_eq!(BidStatus::derive(bid_id, &auction), BidStatus::Active);
    }

    #[test]
    fn test_leader_of_ended_auction_is_winning() {
        let bid_id = BidId::new();
        let auction = auction_with_leader(Some(bid_id), AuctionStatus::Ended);
        assert_eq!(BidStatus::derive(bid_id, &auction), BidStatus::Winning);
    }

    #[test]
    fn test_non_leader_is_outbid() {
        let leader = BidId::new();
        let other = BidId::new();
        let auction = auction_with_leader(Some(leader), AuctionStatus::Active);
        assert_eq!(BidStatus::derive(other, &auction), BidStatus::Outbid);

        let ended = auction_with_leader(Some(leader), AuctionStatus::Ended);
        assert_eq!(BidStatus::derive(other, &ended), BidStatus::Outbid);
    }

    #[test]
    fn test_bid_serialization_roundtrip() {
        let bid = Bid::new(
            AuctionId::new(),
            UserId::new(),
            Price::from_str("19.99").unwrap(),
            1708123456790000000,
            true,
        );
        let json = serde_json::to_string(&bid).unwrap();
        let deserialized: Bid = serde_json::from_str(&json).unwrap();
        assert_eq!(bid, deserialized);
    }
}
