//! Subscription registry
//!
//! Tracks connected observers and their topic memberships. Membership
//! is ephemeral: it lives for the duration of a connection and is never
//! persisted. Join/leave are the only mutation paths, and both are safe
//! to call concurrently with publishes.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::broker::Envelope;
use crate::topic::Topic;

/// Unique observer connection identifier.
pub type ObserverId = u64;

/// Configuration for the broker and its registry.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Bounded outbound queue per observer. When full, the observer is
    /// evicted rather than allowed to stall the publisher.
    pub observer_queue_capacity: usize,
    /// Max topic memberships per observer.
    pub max_subscriptions_per_observer: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            observer_queue_capacity: 256,
            max_subscriptions_per_observer: 128,
        }
    }
}

/// Errors joining a topic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    #[error("observer {0} is not registered")]
    NotRegistered(ObserverId),

    #[error("max subscriptions ({max}) reached")]
    LimitExceeded { max: usize },
}

/// Per-observer state: the outbound channel plus the topics joined.
struct ObserverState {
    sender: mpsc::Sender<Envelope>,
    topics: BTreeSet<Topic>,
}

/// Registry of connected observers and their memberships.
pub struct SubscriptionRegistry {
    observers: DashMap<ObserverId, ObserverState>,
    next_id: AtomicU64,
    config: BrokerConfig,
}

impl SubscriptionRegistry {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            observers: DashMap::new(),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Register a new observer connection.
    ///
    /// Returns the observer id and the receiving half of its bounded
    /// event channel.
    pub fn register(&self) -> (ObserverId, mpsc::Receiver<Envelope>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.config.observer_queue_capacity);
        self.observers.insert(
            id,
            ObserverState {
                sender: tx,
                topics: BTreeSet::new(),
            },
        );
        debug!(observer_id = id, "observer registered");
        (id, rx)
    }

    /// Record a topic join and hand back the observer's sender for
    /// fan-out wiring. Joining a topic twice is a no-op.
    pub fn record_subscribe(
        &self,
        observer_id: ObserverId,
        topic: &Topic,
    ) -> Result<mpsc::Sender<Envelope>, SubscribeError> {
        let mut state = self
            .observers
            .get_mut(&observer_id)
            .ok_or(SubscribeError::NotRegistered(observer_id))?;

        if !state.topics.contains(topic)
            && state.topics.len() >= self.config.max_subscriptions_per_observer
        {
            return Err(SubscribeError::LimitExceeded {
                max: self.config.max_subscriptions_per_observer,
            });
        }

        state.topics.insert(topic.clone());
        Ok(state.sender.clone())
    }

    /// Record a topic leave. Idempotent: leaving a topic the observer
    /// never joined returns false.
    pub fn record_unsubscribe(&self, observer_id: ObserverId, topic: &Topic) -> bool {
        self.observers
            .get_mut(&observer_id)
            .map(|mut state| state.topics.remove(topic))
            .unwrap_or(false)
    }

    /// Remove an observer entirely, returning the topics it was in so
    /// the broker can prune its fan-out maps.
    pub fn remove(&self, observer_id: ObserverId) -> Option<BTreeSet<Topic>> {
        let removed = self
            .observers
            .remove(&observer_id)
            .map(|(_, state)| state.topics);
        if removed.is_some() {
            debug!(observer_id, "observer removed");
        }
        removed
    }

    /// Check whether an observer is currently registered.
    pub fn is_registered(&self, observer_id: ObserverId) -> bool {
        self.observers.contains_key(&observer_id)
    }

    /// Topics an observer is currently joined to.
    pub fn topics_of(&self, observer_id: ObserverId) -> Vec<Topic> {
        self.observers
            .get(&observer_id)
            .map(|state| state.topics.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of connected observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
