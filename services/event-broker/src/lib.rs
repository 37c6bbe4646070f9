//! Event Broker
//!
//! Topic-based publish/subscribe hub connecting the auction engine to
//! every connected observer. Topics are scoped per auction (and, for
//! external collaborators, per product, user, and category). Delivery
//! guarantees:
//!
//! - per-topic ordering: events published P1, P2 to one topic are never
//!   seen out of order by any single subscriber;
//! - at-least-once to currently connected observers, best effort: no
//!   replay or backlog for observers that join later;
//! - publishing never blocks: a slow observer is evicted rather than
//!   back-pressuring the publisher.
//!
//! # Architecture
//!
//! ```text
//!  publish(topic, event)          join/leave
//!        │                            │
//!    ┌───▼────────┐          ┌────────▼────────┐
//!    │ EventBroker │────────▶│ Subscription    │
//!    │  (fan-out)  │          │ Registry        │
//!    └───┬────────┘          └─────────────────┘
//!        │ bounded try_send per subscriber
//!   ┌────┴─────┬──────────┐
//!   ▼          ▼          ▼
//! observer   observer   observer
//! ```

pub mod broker;
pub mod registry;
pub mod topic;

pub use broker::{Envelope, EventBroker, PublishReport};
pub use registry::{BrokerConfig, ObserverId, SubscribeError, SubscriptionRegistry};
pub use topic::Topic;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
