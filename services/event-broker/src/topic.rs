//! Topic grammar for the publish/subscribe hub
//!
//! Observers subscribe to topics, not to entities directly. The auction
//! engine publishes on the four per-auction topics; catalog and account
//! collaborators publish on the product/user/category topics through
//! the same contract.

use serde::{Deserialize, Serialize};
use types::ids::AuctionId;
use uuid::Uuid;

/// A named channel in the broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    /// Price/leader/deadline changes: `auction_updated@{auction_id}`
    AuctionUpdated { auction_id: AuctionId },
    /// Admitted bids: `bid_placed@{auction_id}`
    BidPlaced { auction_id: AuctionId },
    /// Terminal close with winner: `auction_ended@{auction_id}`
    AuctionEnded { auction_id: AuctionId },
    /// Withdrawal: `auction_cancelled@{auction_id}`
    AuctionCancelled { auction_id: AuctionId },
    /// Catalog updates for one product: `product@{product_id}`
    Product { product_id: String },
    /// Account-directed notifications: `user@{user_id}`
    User { user_id: String },
    /// Category-wide listing changes: `category@{category_id}`
    Category { category_id: String },
}

impl Topic {
    /// Parse a topic string into a Topic enum.
    ///
    /// Formats:
    /// - `auction_updated@{uuid}` / `bid_placed@{uuid}` /
    ///   `auction_ended@{uuid}` / `auction_cancelled@{uuid}`
    /// - `product@{id}` / `user@{id}` / `category@{id}`
    pub fn parse(s: &str) -> Option<Self> {
        let (kind, rest) = s.split_once('@')?;
        if rest.is_empty() {
            return None;
        }
        match kind {
            "auction_updated" => Some(Topic::AuctionUpdated {
                auction_id: parse_auction_id(rest)?,
            }),
            "bid_placed" => Some(Topic::BidPlaced {
                auction_id: parse_auction_id(rest)?,
            }),
            "auction_ended" => Some(Topic::AuctionEnded {
                auction_id: parse_auction_id(rest)?,
            }),
            "auction_cancelled" => Some(Topic::AuctionCancelled {
                auction_id: parse_auction_id(rest)?,
            }),
            "product" => Some(Topic::Product {
                product_id: rest.to_string(),
            }),
            "user" => Some(Topic::User {
                user_id: rest.to_string(),
            }),
            "category" => Some(Topic::Category {
                category_id: rest.to_string(),
            }),
            _ => None,
        }
    }

    /// Serialize as topic string.
    pub fn to_topic_string(&self) -> String {
        match self {
            Topic::AuctionUpdated { auction_id } => format!("auction_updated@{}", auction_id),
            Topic::BidPlaced { auction_id } => format!("bid_placed@{}", auction_id),
            Topic::AuctionEnded { auction_id } => format!("auction_ended@{}", auction_id),
            Topic::AuctionCancelled { auction_id } => format!("auction_cancelled@{}", auction_id),
            Topic::Product { product_id } => format!("product@{}", product_id),
            Topic::User { user_id } => format!("user@{}", user_id),
            Topic::Category { category_id } => format!("category@{}", category_id),
        }
    }
}

fn parse_auction_id(s: &str) -> Option<AuctionId> {
    s.parse::<Uuid>().ok().map(AuctionId::from_uuid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auction_topic_roundtrip() {
        let auction_id = AuctionId::new();
        for topic in [
            Topic::AuctionUpdated { auction_id },
            Topic::BidPlaced { auction_id },
            Topic::AuctionEnded { auction_id },
            Topic::AuctionCancelled { auction_id },
        ] {
            let s = topic.to_topic_string();
            assert_eq!(Topic::parse(&s), Some(topic));
        }
    }

    #[test]
    fn test_collaborator_topics() {
        let topic = Topic::parse("product@SKU-1234").unwrap();
        assert_eq!(
            topic,
            Topic::Product {
                product_id: "SKU-1234".to_string()
            }
        );
        assert_eq!(topic.to_topic_string(), "product@SKU-1234");

        assert!(Topic::parse("user@42").is_some());
        assert!(Topic::parse("category@electronics").is_some());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Topic::parse("no-separator").is_none());
        assert!(Topic::parse("unknown@abc").is_none());
        assert!(Topic::parse("product@").is_none());
        // Auction topics require a valid UUID
        assert!(Topic::parse("bid_placed@not-a-uuid").is_none());
    }

    #[test]
    fn test_topics_for_same_auction_are_distinct() {
        let auction_id = AuctionId::new();
        let updated = Topic::AuctionUpdated { auction_id };
        let placed = Topic::BidPlaced { auction_id };
        assert_ne!(updated, placed);
    }
}
