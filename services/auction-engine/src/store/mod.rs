//! Durable-store collaborator contracts
//!
//! The engine consumes storage through two narrow traits: an auction
//! store with versioned compare-and-set semantics and an append-only
//! bid ledger. [`MemoryStore`] implements both for tests and
//! single-process deployments; a database-backed implementation swaps
//! in behind the same traits (versioned rows stand in for native CAS).

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use types::auction::{Auction, AuctionStatus};
use types::bid::Bid;
use types::errors::StoreError;
use types::ids::{AuctionId, BidId};
use types::money::Price;

/// Typed partial update applied through [`AuctionStore::conditional_update`].
///
/// Only the populated fields change; the version counter and
/// `updated_at` always advance. Grouping price, leader, deadline, and
/// bid count into one update is what makes an admission (including its
/// anti-snipe extension) atomic.
#[derive(Debug, Clone)]
pub struct AuctionUpdate {
    pub current_price: Option<Price>,
    pub leader_bid_id: Option<BidId>,
    pub end_time: Option<i64>,
    pub status: Option<AuctionStatus>,
    pub bid_count: Option<u64>,
    pub updated_at: i64,
}

impl AuctionUpdate {
    /// An update touching nothing but the bookkeeping fields.
    pub fn at(updated_at: i64) -> Self {
        Self {
            current_price: None,
            leader_bid_id: None,
            end_time: None,
            status: None,
            bid_count: None,
            updated_at,
        }
    }

    pub fn status(mut self, status: AuctionStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Durable record of auctions with compare-and-set price updates.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// Persist a new auction. Fails `AlreadyExists` on id collision.
    async fn insert(&self, auction: Auction) -> Result<(), StoreError>;

    /// Read one auction.
    async fn read(&self, auction_id: AuctionId) -> Result<Option<Auction>, StoreError>;

    /// Apply `update` only if the stored version still equals
    /// `expected_version`; otherwise fail `VersionConflict` and change
    /// nothing. Returns the record as committed.
    async fn conditional_update(
        &self,
        auction_id: AuctionId,
        expected_version: u64,
        update: AuctionUpdate,
    ) -> Result<Auction, StoreError>;

    /// Ids of Active auctions whose deadline is at or before `deadline`,
    /// the sweep's work list.
    async fn active_expiring_before(&self, deadline: i64) -> Result<Vec<AuctionId>, StoreError>;
}

/// Append-only durable record of every bid ever admitted.
#[async_trait]
pub trait BidLedger: Send + Sync {
    /// Append an admitted bid. Entries are never mutated or deleted.
    async fn append(&self, bid: Bid) -> Result<(), StoreError>;

    /// Page through an auction's bids in append order.
    async fn bids_for_auction(
        &self,
        auction_id: AuctionId,
        page: usize,
        limit: usize,
    ) -> Result<Vec<Bid>, StoreError>;

    /// Number of ledger entries for an auction.
    async fn bid_count(&self, auction_id: AuctionId) -> Result<u64, StoreError>;
}
