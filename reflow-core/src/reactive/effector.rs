//! Effector Implementation
//!
//! An Effector is a side-effect-only subscriber. It caches nothing, so there
//! is nothing to be lazy about: its callback runs immediately whenever any of
//! its bound parents is invalidated, with full read access to the graph.
//!
//! Unlike a computer, the declared parent list is used exactly as given: no
//! flattening through intermediate computers. An effector bound to a computer
//! fires when that computer is invalidated, not when arbitrary further
//! ancestors change.

use std::fmt;

use crate::graph::NodeId;

use super::EffectorFn;

/// A side-effect-only reactive subscriber.
pub struct Effector {
    /// Unique identifier, also the registry key.
    pub(crate) id: NodeId,

    /// Parent ids exactly as declared at creation.
    pub(crate) parents: Vec<NodeId>,

    /// Invoked with the graph whenever a parent is invalidated.
    pub(crate) callback: EffectorFn,
}

impl Effector {
    pub(crate) fn new(id: NodeId, parents: Vec<NodeId>, callback: EffectorFn) -> Self {
        Self {
            id,
            parents,
            callback,
        }
    }
}

impl fmt::Debug for Effector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effector")
            .field("id", &self.id)
            .field("parents", &self.parents)
            .finish()
    }
}
