//! Computer Implementation
//!
//! A Computer is a memoized derived value. It caches the result of its
//! `evaluate` closure and recomputes only when an ancestor signal has changed
//! and the value is actually requested (pull phase).
//!
//! # Dependency Flattening
//!
//! At construction time the declared parents are flattened into two lists:
//!
//! - `root_signals`: the set of Signal ids this node ultimately depends on.
//!   A Signal parent contributes itself; a Computer parent contributes its
//!   own `root_signals`. The computer subscribes to every id in this set, so
//!   a change anywhere upstream reaches it directly.
//!
//! - `eval_order`: ancestor Computers in dependency-first order. A Computer
//!   parent contributes its own `eval_order` followed by itself, so forcing
//!   the list front to back always evaluates dependencies before dependents.
//!
//! Both lists are deduplicated: `root_signals` by sort + unique (avoiding
//! redundant subscriptions), `eval_order` by first occurrence (avoiding
//! redundant forced recomputation while preserving dependency order).

use smallvec::SmallVec;
use std::fmt;

use crate::graph::NodeId;

use super::topic::Topic;
use super::{EffectFn, EvalFn, Value};

/// A memoized, lazily recomputed derived node.
pub struct Computer {
    /// Unique identifier, also the registry key.
    pub(crate) id: NodeId,

    /// Stale marker. Starts true so the first read evaluates.
    pub(crate) dirty: bool,

    /// Cached result, meaningful only while `!dirty`.
    pub(crate) value: Option<Value>,

    /// Deduplicated Signal ids this node transitively depends on.
    pub(crate) root_signals: Vec<NodeId>,

    /// Ancestor Computers in dependency-first order.
    pub(crate) eval_order: Vec<NodeId>,

    /// Parents exactly as declared, kept for unsubscription on removal.
    pub(crate) parents: Vec<NodeId>,

    /// The evaluation closure.
    pub(crate) evaluate: EvalFn,

    /// Optional listener invoked with each freshly computed value.
    pub(crate) effect: Option<EffectFn>,

    /// Subscriber ids in registration order.
    pub(crate) subscribers: SmallVec<[NodeId; 4]>,
}

impl Computer {
    pub(crate) fn new(
        id: NodeId,
        plan: DependencyPlan,
        parents: Vec<NodeId>,
        evaluate: EvalFn,
        effect: Option<EffectFn>,
    ) -> Self {
        Self {
            id,
            dirty: true,
            value: None,
            root_signals: plan.roots,
            eval_order: plan.order,
            parents,
            evaluate,
            effect,
            subscribers: SmallVec::new(),
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Topic for Computer {
    fn subscribe(&mut self, subscriber: NodeId) {
        self.subscribers.push(subscriber);
    }

    fn unsubscribe(&mut self, subscriber: NodeId) {
        self.subscribers.retain(|s| *s != subscriber);
    }
}

impl fmt::Debug for Computer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computer")
            .field("id", &self.id)
            .field("dirty", &self.dirty)
            .field("root_signals", &self.root_signals)
            .field("eval_order", &self.eval_order)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Accumulates flattened dependencies while a computer is being constructed.
///
/// The plan is fed one declared parent at a time, then [`finish`]ed to
/// deduplicate. Subscriptions happen only after deduplication.
///
/// [`finish`]: DependencyPlan::finish
pub(crate) struct DependencyPlan {
    /// Signal ids, deduplicated by `finish`.
    pub(crate) roots: Vec<NodeId>,

    /// Ancestor computers, dependency-first, deduplicated by `finish`.
    pub(crate) order: Vec<NodeId>,
}

impl DependencyPlan {
    pub(crate) fn new() -> Self {
        Self {
            roots: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Record a Signal parent.
    pub(crate) fn add_signal(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    /// Record a Computer parent: union its roots, then append its own
    /// evaluation order followed by the parent itself.
    pub(crate) fn add_computer(&mut self, id: NodeId, parent: &Computer) {
        self.roots.extend_from_slice(&parent.root_signals);
        self.order.extend_from_slice(&parent.eval_order);
        self.order.push(id);
    }

    /// Deduplicate: roots by sort + unique, order by first occurrence.
    pub(crate) fn finish(&mut self) {
        self.roots.sort_unstable();
        self.roots.dedup();

        let mut seen = std::collections::HashSet::with_capacity(self.order.len());
        self.order.retain(|id| seen.insert(*id));
    }
}
