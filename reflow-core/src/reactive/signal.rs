//! Signal Implementation
//!
//! A Signal is the mutable state cell at the root of the dependency graph.
//! It holds a [`Value`] and an ordered list of subscriber ids.
//!
//! # How Signals Work
//!
//! 1. Computers that (transitively) depend on a signal subscribe to it at
//!    construction time.
//!
//! 2. When the signal's value changes, the graph walks the subscriber list in
//!    registration order: computers are marked dirty (push phase), effectors
//!    run immediately.
//!
//! 3. The signal's own `effect` callback, if present, fires last with the new
//!    value.
//!
//! Signals live inside the registry and are only ever touched by the worker
//! thread, so no locking is involved.

use smallvec::SmallVec;
use std::fmt;

use crate::graph::NodeId;

use super::topic::Topic;
use super::{EffectFn, Value};

/// A mutable reactive state cell.
pub struct Signal {
    /// Unique identifier, also the registry key.
    pub(crate) id: NodeId,

    /// The current value.
    pub(crate) value: Value,

    /// Subscriber ids in registration order.
    pub(crate) subscribers: SmallVec<[NodeId; 4]>,

    /// Optional listener invoked after subscribers on every change.
    pub(crate) effect: Option<EffectFn>,
}

impl Signal {
    pub(crate) fn new(id: NodeId, value: Value, effect: Option<EffectFn>) -> Self {
        Self {
            id,
            value,
            subscribers: SmallVec::new(),
            effect,
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Topic for Signal {
    fn subscribe(&mut self, subscriber: NodeId) {
        self.subscribers.push(subscriber);
    }

    fn unsubscribe(&mut self, subscriber: NodeId) {
        self.subscribers.retain(|s| *s != subscriber);
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &self.value)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
