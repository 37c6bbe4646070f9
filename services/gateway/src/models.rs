use serde::{Deserialize, Serialize};
use types::auction::{Auction, AuctionStatus};
use types::bid::Bid;
use types::ids::{AuctionId, BidId, UserId};
use types::money::Price;
use types::principal::Principal;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuctionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starting_price: Price,
    pub reserve_price: Option<Price>,
    pub bid_increment: Price,
    pub start_time: i64,
    pub end_time: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ActivateRequest {
    /// Open before the scheduled start time
    #[serde(default)]
    pub override_start: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceBidRequest {
    pub amount: Price,
    #[serde(default)]
    pub is_auto_bid: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Clone, Serialize)]
pub struct AuctionResponse {
    pub auction_id: AuctionId,
    pub seller_id: UserId,
    pub title: String,
    pub description: String,
    pub starting_price: Price,
    /// Present only for the seller and admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve_price: Option<Price>,
    pub bid_increment: Price,
    pub current_price: Price,
    pub leader_bid_id: Option<BidId>,
    pub min_next_bid: Price,
    pub start_time: i64,
    pub end_time: i64,
    pub status: AuctionStatus,
    pub bid_count: u64,
}

impl AuctionResponse {
    /// Project an auction for a viewer, hiding the reserve price from
    /// anyone but the seller and admins.
    pub fn for_viewer(auction: Auction, viewer: &Principal) -> Self {
        let reserve_visible = viewer.is_admin() || viewer.id == auction.seller_id;
        let min_next_bid = auction.min_acceptable_bid();
        Self {
            auction_id: auction.auction_id,
            seller_id: auction.seller_id,
            title: auction.title,
            description: auction.description,
            starting_price: auction.starting_price,
            reserve_price: auction.reserve_price.filter(|_| reserve_visible),
            bid_increment: auction.bid_increment,
            current_price: auction.current_price,
            leader_bid_id: auction.leader_bid_id,
            min_next_bid,
            start_time: auction.start_time,
            end_time: auction.end_time,
            status: auction.status,
            bid_count: auction.bid_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BidResponse {
    pub bid_id: BidId,
    pub auction_id: AuctionId,
    pub amount: Price,
    pub placed_at: i64,
    pub is_auto_bid: bool,
}

impl From<Bid> for BidResponse {
    fn from(bid: Bid) -> Self {
        Self {
            bid_id: bid.bid_id,
            auction_id: bid.auction_id,
            amount: bid.amount,
            placed_at: bid.placed_at,
            is_auto_bid: bid.is_auto_bid,
        }
    }
}
