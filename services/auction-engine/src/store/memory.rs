//! In-memory store implementation
//!
//! Backs the store traits with DashMap. Per-key entry locking provides
//! the write atomicity the contracts require; the version check inside
//! the entry lock provides compare-and-set. Unrelated auctions live in
//! independent entries and never contend.

use async_trait::async_trait;
use dashmap::DashMap;
use types::auction::{Auction, AuctionStatus};
use types::bid::Bid;
use types::errors::StoreError;
use types::ids::AuctionId;

use super::{AuctionStore, AuctionUpdate, BidLedger};

/// DashMap-backed auction store and bid ledger.
#[derive(Default)]
pub struct MemoryStore {
    auctions: DashMap<AuctionId, Auction>,
    bids: DashMap<AuctionId, Vec<Bid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored auctions.
    pub fn auction_count(&self) -> usize {
        self.auctions.len()
    }
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn insert(&self, auction: Auction) -> Result<(), StoreError> {
        match self.auctions.entry(auction.auction_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(auction);
                Ok(())
            }
        }
    }

    async fn read(&self, auction_id: AuctionId) -> Result<Option<Auction>, StoreError> {
        Ok(self.auctions.get(&auction_id).map(|a| a.clone()))
    }

    async fn conditional_update(
        &self,
        auction_id: AuctionId,
        expected_version: u64,
        update: AuctionUpdate,
    ) -> Result<Auction, StoreError> {
        let mut auction = self
            .auctions
            .get_mut(&auction_id)
            .ok_or(StoreError::NotFound)?;

        if auction.version != expected_version {
            return Err(StoreError::VersionConflict);
        }

        if let Some(price) = update.current_price {
            auction.current_price = price;
        }
        if let Some(leader) = update.leader_bid_id {
            auction.leader_bid_id = Some(leader);
        }
        if let Some(end_time) = update.end_time {
            auction.end_time = end_time;
        }
        if let Some(status) = update.status {
            auction.status = status;
        }
        if let Some(bid_count) = update.bid_count {
            auction.bid_count = bid_count;
        }
        auction.updated_at = update.updated_at;
        auction.version += 1;

        Ok(auction.clone())
    }

    async fn active_expiring_before(&self, deadline: i64) -> Result<Vec<AuctionId>, StoreError> {
        Ok(self
            .auctions
            .iter()
            .filter(|entry| entry.status == AuctionStatus::Active && entry.end_time <= deadline)
            .map(|entry| entry.auction_id)
            .collect())
    }
}

#[async_trait]
impl BidLedger for MemoryStore {
    async fn append(&self, bid: Bid) -> Result<(), StoreError> {
        self.bids.entry(bid.auction_id).or_default().push(bid);
        Ok(())
    }

    async fn bids_for_auction(
        &self,
        auction_id: AuctionId,
        page: usize,
        limit: usize,
    ) -> Result<Vec<Bid>, StoreError> {
        Ok(self
            .bids
            .get(&auction_id)
            .map(|entries| {
                entries
                    .iter()
                    .skip(page.saturating_mul(limit))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn bid_count(&self, auction_id: AuctionId) -> Result<u64, StoreError> {
        Ok(self
            .bids
            .get(&auction_id)
            .map(|entries| entries.len() as u64)
            .unwrap_or(0))
    }
}
