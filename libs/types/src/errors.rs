//! Error taxonomy for the auction platform
//!
//! Three families with distinct retry semantics:
//! - validation errors (BidTooLow, SelfBidNotAllowed, InvalidTransition)
//!   are reported to the caller and never retried automatically;
//! - contention errors are transient and safe to retry;
//! - store errors fail fast and surface as retryable faults.

use crate::auction::AuctionStatus;
use crate::ids::AuctionId;
use crate::money::Price;
use thiserror::Error;

/// Errors from the durable-store collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Conditional update lost the race; re-read and retry
    #[error("version conflict on conditional update")]
    VersionConflict,

    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Errors admitting a bid
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BidError {
    #[error("auction not found: {auction_id}")]
    AuctionNotFound { auction_id: AuctionId },

    #[error("auction {auction_id} is not accepting bids (status {status})")]
    AuctionNotActive {
        auction_id: AuctionId,
        status: AuctionStatus,
    },

    #[error("sellers cannot bid on their own auction")]
    SelfBidNotAllowed,

    #[error("bid of {amount} is below the minimum acceptable {floor}")]
    BidTooLow { amount: Price, floor: Price },

    /// Retry bound exhausted under concurrent bidding; safe to retry
    #[error("auction {auction_id} under contention, gave up after {attempts} attempts")]
    Contention {
        auction_id: AuctionId,
        attempts: u32,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors transitioning an auction through its lifecycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    #[error("auction not found: {auction_id}")]
    AuctionNotFound { auction_id: AuctionId },

    #[error("invalid auction parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: AuctionStatus,
        to: AuctionStatus,
    },

    #[error("caller is not permitted to perform this transition")]
    NotPermitted,

    /// Cancelling an auction with standing bids is rejected, never
    /// silently turned into a no-op
    #[error("auction {auction_id} has {bid_count} bid(s) and cannot be cancelled")]
    CancelWithBids {
        auction_id: AuctionId,
        bid_count: u64,
    },

    #[error("auction {auction_id} under contention; retry the transition")]
    Contention { auction_id: AuctionId },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_too_low_display() {
        let err = BidError::BidTooLow {
            amount: Price::from_u64(105),
            floor: Price::from_u64(110),
        };
        assert_eq!(
            err.to_string(),
            "bid of 105 is below the minimum acceptable 110"
        );
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = LifecycleError::InvalidTransition {
            from: AuctionStatus::Ended,
            to: AuctionStatus::Active,
        };
        assert!(err.to_string().contains("ENDED"));
        assert!(err.to_string().contains("ACTIVE"));
    }

    #[test]
    fn test_bid_error_from_store_error() {
        let store_err = StoreError::VersionConflict;
        let bid_err: BidError = store_err.into();
        assert!(matches!(bid_err, BidError::Store(StoreError::VersionConflict)));
    }

    #[test]
    fn test_lifecycle_error_from_store_error() {
        let err: LifecycleError = StoreError::Unavailable {
            reason: "connection refused".to_string(),
        }
        .into();
        assert!(matches!(err, LifecycleError::Store(_)));
    }
}
