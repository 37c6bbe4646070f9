//! Auction Bidding Engine
//!
//! The correctness-critical core of the marketplace: admits bids under
//! concurrent access, owns auction lifecycle transitions, and fans out
//! state changes through the event broker.
//!
//! Concurrent writers on one auction are serialized exclusively through
//! versioned compare-and-set on the store (no in-process locks), so
//! unrelated auctions never contend and multiple server processes can
//! share one durable store.
//!
//! # Architecture
//!
//! ```text
//!   place_bid            activate/cancel/end      interval timer
//!       │                        │                      │
//!  ┌────▼──────┐          ┌──────▼──────┐         ┌─────▼────┐
//!  │   Bid     │          │  Lifecycle  │◀────────│ Sweeper  │
//!  │ Admission │          │   Manager   │         └──────────┘
//!  └────┬──────┘          └──────┬──────┘
//!       │  versioned CAS         │
//!  ┌────▼────────────────────────▼────┐
//!  │      AuctionStore / BidLedger    │
//!  └────┬─────────────────────────────┘
//!       │ bid_placed / auction_updated / auction_ended / auction_cancelled
//!  ┌────▼──────────┐
//!  │  EventBroker  │
//!  └───────────────┘
//! ```

pub mod admission;
pub mod clock;
pub mod config;
pub mod events;
pub mod lifecycle;
pub mod store;
pub mod sweep;

pub use admission::{BidAdmission, BidView};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use events::AuctionEvent;
pub use lifecycle::{CreateAuction, LifecycleManager, SweepReport};
pub use store::{AuctionStore, AuctionUpdate, BidLedger, MemoryStore};
pub use sweep::Sweeper;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
