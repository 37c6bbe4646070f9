//! Publish/subscribe hub with non-blocking fan-out
//!
//! Publishing stamps a per-topic sequence and delivers to every current
//! subscriber of the topic with a bounded `try_send`. The sequence is
//! assigned and the fan-out performed while holding the topic's map
//! entry, so two publishes to the same topic reach every subscriber in
//! sequence order. Publishes to different topics do not contend.
//!
//! A subscriber whose queue is full is evicted rather than allowed to
//! stall the publisher; a subscriber whose receiver is gone is pruned.

use std::collections::BTreeMap;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::registry::{BrokerConfig, ObserverId, SubscribeError, SubscriptionRegistry};
use crate::topic::Topic;

/// A published event as delivered to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique event identifier (UUID v7)
    pub event_id: Uuid,
    /// Topic string the event was published on
    pub topic: String,
    /// Per-topic monotonic sequence number
    pub sequence: u64,
    /// Event type label (e.g., "bid_placed")
    pub event_type: String,
    /// Event-specific payload
    pub payload: Value,
    /// Publish timestamp (Unix nanos)
    pub published_at: i64,
}

/// Outcome of one publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// Sequence number assigned to the event on its topic
    pub sequence: u64,
    /// Observers the event was handed to
    pub delivered: usize,
    /// Observers evicted for lagging or vanished receivers
    pub evicted: Vec<ObserverId>,
}

/// Per-topic fan-out state. Sequence survives an empty membership so
/// reconnecting observers never see it restart.
#[derive(Default)]
struct TopicState {
    sequence: u64,
    members: BTreeMap<ObserverId, mpsc::Sender<Envelope>>,
}

/// The topic-based publish/subscribe hub.
pub struct EventBroker {
    registry: SubscriptionRegistry,
    topics: DashMap<Topic, TopicState>,
}

impl EventBroker {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            registry: SubscriptionRegistry::new(config),
            topics: DashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(BrokerConfig::default())
    }

    /// Register a new observer connection; the receiver yields every
    /// event published to topics the observer subsequently joins.
    pub fn register(&self) -> (ObserverId, mpsc::Receiver<Envelope>) {
        self.registry.register()
    }

    /// Join an observer to a topic.
    pub fn subscribe(&self, observer_id: ObserverId, topic: &Topic) -> Result<(), SubscribeError> {
        let sender = self.registry.record_subscribe(observer_id, topic)?;
        self.topics
            .entry(topic.clone())
            .or_default()
            .members
            .insert(observer_id, sender);
        debug!(observer_id, topic = %topic.to_topic_string(), "subscribed");
        Ok(())
    }

    /// Remove an observer from a topic. Idempotent.
    pub fn unsubscribe(&self, observer_id: ObserverId, topic: &Topic) {
        self.registry.record_unsubscribe(observer_id, topic);
        if let Some(mut state) = self.topics.get_mut(topic) {
            state.members.remove(&observer_id);
        }
    }

    /// Drop an observer and all of its memberships (connection closed,
    /// or evicted for lagging).
    pub fn disconnect(&self, observer_id: ObserverId) {
        if let Some(topics) = self.registry.remove(observer_id) {
            for topic in topics {
                if let Some(mut state) = self.topics.get_mut(&topic) {
                    state.members.remove(&observer_id);
                }
            }
        }
    }

    /// Publish an event to every current subscriber of `topic`.
    ///
    /// Never blocks: delivery uses bounded `try_send`, and an observer
    /// that cannot keep up is evicted. Observers not connected at
    /// publish time never receive the event.
    pub fn publish(
        &self,
        topic: &Topic,
        event_type: &str,
        payload: Value,
        published_at: i64,
    ) -> PublishReport {
        let mut delivered = 0usize;
        let mut evict = Vec::new();

        let sequence = {
            let mut state = self.topics.entry(topic.clone()).or_default();
            state.sequence += 1;
            let envelope = Envelope {
                event_id: Uuid::now_v7(),
                topic: topic.to_topic_string(),
                sequence: state.sequence,
                event_type: event_type.to_string(),
                payload,
                published_at,
            };

            for (&observer_id, sender) in state.members.iter() {
                match sender.try_send(envelope.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!(
                            observer_id,
                            topic = %envelope.topic,
                            "observer queue full, evicting lagging observer"
                        );
                        evict.push(observer_id);
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!(observer_id, topic = %envelope.topic, "observer gone, pruning");
                        evict.push(observer_id);
                    }
                }
            }
            state.sequence
        };

        // Eviction touches other topics' entries; do it only after the
        // published topic's entry lock is released.
        for &observer_id in &evict {
            self.disconnect(observer_id);
        }

        PublishReport {
            sequence,
            delivered,
            evicted: evict,
        }
    }

    /// Current subscriber count for a topic.
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics
            .get(topic)
            .map(|state| state.members.len())
            .unwrap_or(0)
    }

    /// Number of connected observers.
    pub fn observer_count(&self) -> usize {
        self.registry.observer_count()
    }
}
