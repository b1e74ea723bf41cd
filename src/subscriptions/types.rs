//! Subscription types for live catalog updates.

use crate::types::{Message, MessageId, Toy, ToyId};
use serde::{Deserialize, Serialize};

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: 1000
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: SubscriptionFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            filter: SubscriptionFilter::all(),
        }
    }
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// Only events about these toys (None = every toy).
    pub toy_ids: Option<Vec<ToyId>>,

    /// Include toy add/update/remove events.
    pub include_toys: bool,

    /// Include message add/remove events.
    pub include_messages: bool,
}

impl SubscriptionFilter {
    /// Toy lifecycle events only.
    pub fn toys() -> Self {
        Self {
            include_toys: true,
            ..Default::default()
        }
    }

    /// Message events for the given toys (the per-toy chat feed).
    pub fn messages_for(toy_ids: Vec<ToyId>) -> Self {
        Self {
            toy_ids: Some(toy_ids),
            include_messages: true,
            ..Default::default()
        }
    }

    /// Subscribe to everything.
    pub fn all() -> Self {
        Self {
            include_toys: true,
            include_messages: true,
            ..Default::default()
        }
    }

    pub(crate) fn wants_toy(&self, id: &ToyId) -> bool {
        match &self.toy_ids {
            Some(ids) => ids.contains(id),
            None => true,
        }
    }
}

/// Events emitted after a mutation has been flushed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    ToyAdded {
        toy: Toy,
    },

    ToyUpdated {
        toy: Toy,
    },

    ToyRemoved {
        id: ToyId,
    },

    MessageAdded {
        toy_id: ToyId,
        message: Message,
    },

    MessageRemoved {
        toy_id: ToyId,
        message_id: MessageId,
    },

    /// Subscription was dropped.
    Dropped {
        reason: DropReason,
    },
}

impl StoreEvent {
    /// The toy this event is about, if any.
    pub fn toy_id(&self) -> Option<&ToyId> {
        match self {
            StoreEvent::ToyAdded { toy } | StoreEvent::ToyUpdated { toy } => Some(&toy.id),
            StoreEvent::ToyRemoved { id } => Some(id),
            StoreEvent::MessageAdded { toy_id, .. } | StoreEvent::MessageRemoved { toy_id, .. } => {
                Some(toy_id)
            }
            StoreEvent::Dropped { .. } => None,
        }
    }

    pub(crate) fn is_message_event(&self) -> bool {
        matches!(
            self,
            StoreEvent::MessageAdded { .. } | StoreEvent::MessageRemoved { .. }
        )
    }
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<StoreEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<StoreEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<StoreEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<StoreEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
