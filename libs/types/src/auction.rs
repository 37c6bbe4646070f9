//! Auction record and lifecycle state machine
//!
//! An auction moves Draft → Scheduled → Active → {Ended, Cancelled}.
//! Transitions are monotonic: once a terminal state is reached no
//! further transitions are possible. The `version` field is an
//! optimistic-locking counter bumped on every store mutation, which is
//! what serializes concurrent writers on the same auction.

use crate::ids::{AuctionId, BidId, UserId};
use crate::money::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Auction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionStatus {
    /// Created by the seller, not yet visible to bidders
    Draft,
    /// Published with a future start time
    Scheduled,
    /// Open for bidding
    Active,
    /// Closed, winner (if any) determined (terminal)
    Ended,
    /// Withdrawn before completion (terminal)
    Cancelled,
}

impl AuctionStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuctionStatus::Ended | AuctionStatus::Cancelled)
    }

    /// Check whether the state machine permits `self → next`
    ///
    /// Cancellation from Active carries an additional zero-bids rule
    /// enforced by the lifecycle manager, not encoded here.
    pub fn can_transition_to(&self, next: AuctionStatus) -> bool {
        use AuctionStatus::*;
        matches!(
            (self, next),
            (Draft, Scheduled)
                | (Draft, Active)
                | (Draft, Cancelled)
                | (Scheduled, Active)
                | (Scheduled, Cancelled)
                | (Active, Ended)
                | (Active, Cancelled)
        )
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuctionStatus::Draft => "DRAFT",
            AuctionStatus::Scheduled => "SCHEDULED",
            AuctionStatus::Active => "ACTIVE",
            AuctionStatus::Ended => "ENDED",
            AuctionStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", label)
    }
}

/// Complete auction record
///
/// `title` and `description` are opaque payloads carried for the
/// catalog; the bidding engine never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    pub auction_id: AuctionId,
    pub seller_id: UserId,
    pub title: String,
    pub description: String,
    pub starting_price: Price,
    /// Minimum price the seller will accept; hidden from bidders
    pub reserve_price: Option<Price>,
    /// Minimum delta between successive bids
    pub bid_increment: Price,
    pub current_price: Price,
    /// The bid currently winning; at most one per auction
    pub leader_bid_id: Option<BidId>,
    pub start_time: i64, // Unix nanos
    pub end_time: i64,   // Unix nanos
    pub status: AuctionStatus,
    /// Number of admitted bids, maintained in the same atomic update
    /// as the price so the zero-bids cancellation rule cannot race
    pub bid_count: u64,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
    pub version: u64,    // Optimistic locking
}

impl Auction {
    /// Create a new draft auction
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seller_id: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        starting_price: Price,
        reserve_price: Option<Price>,
        bid_increment: Price,
        start_time: i64,
        end_time: i64,
        timestamp: i64,
    ) -> Self {
        Self {
            auction_id: AuctionId::new(),
            seller_id,
            title: title.into(),
            description: description.into(),
            starting_price,
            reserve_price,
            bid_increment,
            current_price: starting_price,
            leader_bid_id: None,
            start_time,
            end_time,
            status: AuctionStatus::Draft,
            bid_count: 0,
            created_at: timestamp,
            updated_at: timestamp,
            version: 0,
        }
    }

    /// Check if any bid has been admitted
    pub fn has_bids(&self) -> bool {
        self.bid_count > 0
    }

    /// Lowest amount the next bid must reach
    ///
    /// The first bid may equal the starting price; every later bid must
    /// clear the current price by at least the increment.
    pub fn min_acceptable_bid(&self) -> Price {
        if self.leader_bid_id.is_none() {
            self.starting_price
        } else {
            self.current_price + self.bid_increment
        }
    }

    /// Check if the auction accepts bids at `now`
    ///
    /// Both conditions are required: the status can lag the sweep, and
    /// the sweep can lag the deadline.
    pub fn is_open_at(&self, now: i64) -> bool {
        self.status == AuctionStatus::Active && now < self.end_time
    }

    /// Check if `now` falls inside the closing window of the auction
    pub fn in_closing_window(&self, now: i64, window_nanos: i64) -> bool {
        self.end_time - now <= window_nanos
    }

    /// Check the price invariant: current price never below starting price
    pub fn check_invariant(&self) -> bool {
        self.current_price >= self.starting_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_auction() -> Auction {
        Auction::new(
            UserId::new(),
            "Vintage camera",
            "Working condition, some wear",
            Price::from_u64(100),
            None,
            Price::from_u64(10),
            1708123456789000000,
            1708123456789000000 + 86_400_000_000_000,
            1708123456789000000,
        )
    }

    #[test]
    fn test_auction_creation() {
        let auction = sample_auction();
        assert_eq!(auction.status, AuctionStatus::Draft);
        assert_eq!(auction.current_price, auction.starting_price);
        assert!(auction.leader_bid_id.is_none());
        assert!(!auction.has_bids());
        assert!(auction.check_invariant());
        assert_eq!(auction.version, 0);
    }

    #[test]
    fn test_status_transitions() {
        use AuctionStatus::*;
        assert!(Draft.can_transition_to(Scheduled));
        assert!(Draft.can_transition_to(Active));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(Active));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Ended));
        assert!(Active.can_transition_to(Cancelled));

        // No backwards or out-of-terminal transitions
        assert!(!Scheduled.can_transition_to(Draft));
        assert!(!Active.can_transition_to(Scheduled));
        assert!(!Ended.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(Active));
        assert!(!Ended.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(AuctionStatus::Ended.is_terminal());
        assert!(AuctionStatus::Cancelled.is_terminal());
        assert!(!AuctionStatus::Draft.is_terminal());
        assert!(!AuctionStatus::Scheduled.is_terminal());
        assert!(!AuctionStatus::Active.is_terminal());
    }

    #[test]
    fn test_min_acceptable_bid_no_bids() {
        let auction = sample_auction();
        // First bid may match the starting price exactly
        assert_eq!(auction.min_acceptable_bid(), Price::from_u64(100));
    }

    #[test]
    fn test_min_acceptable_bid_with_leader() {
        let mut auction = sample_auction();
        auction.leader_bid_id = Some(BidId::new());
        auction.current_price = Price::from_u64(100);
        auction.bid_count = 1;
        assert_eq!(auction.min_acceptable_bid(), Price::from_u64(110));
    }

    #[test]
    fn test_is_open_at() {
        let mut auction = sample_auction();
        let start = auction.start_time;

        // Draft is never open, regardless of time
        assert!(!auction.is_open_at(start + 1));

        auction.status = AuctionStatus::Active;
        assert!(auction.is_open_at(start + 1));
        assert!(!auction.is_open_at(auction.end_time));
        assert!(!auction.is_open_at(auction.end_time + 1));
    }

    #[test]
    fn test_closing_window() {
        let mut auction = sample_auction();
        auction.status = AuctionStatus::Active;
        let window = 30_000_000_000; // 30s

        assert!(!auction.in_closing_window(auction.end_time - 60_000_000_000, window));
        assert!(auction.in_closing_window(auction.end_time - 10_000_000_000, window));
        assert!(auction.in_closing_window(auction.end_time - window, window));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&AuctionStatus::Active).unwrap();
        assert_eq!(json, "\"ACTIVE\"");
        let status: AuctionStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(status, AuctionStatus::Cancelled);
    }

    #[test]
    fn test_auction_serialization_roundtrip() {
        let auction = sample_auction();
        let json = serde_json::to_string(&auction).unwrap();
        let deserialized: Auction = serde_json::from_str(&json).unwrap();
        assert_eq!(auction, deserialized);
    }
}
