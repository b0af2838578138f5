//! Graph Nodes
//!
//! Node identifiers and the tagged union over the three node kinds.

use std::fmt;

use crate::reactive::{Computer, Effector, Signal, Topic};

/// Unique identifier for a node in the dependency graph.
///
/// Ids are allocated from a monotonically increasing counter owned by the
/// processor and are never reused; a removed id is simply absent from the
/// registry. An id is handed to the caller before the corresponding creation
/// command has been applied by the worker, so operations on an id may observe
/// a not-yet-materialized node and resolve as no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registry entry: one of the three node kinds.
#[derive(Debug)]
pub(crate) enum Node {
    Signal(Signal),
    Computer(Computer),
    Effector(Effector),
}

impl Node {
    /// View the node through the shared subscribe/unsubscribe capability.
    ///
    /// Effectors are not topics: nothing can subscribe to them.
    pub(crate) fn as_topic_mut(&mut self) -> Option<&mut dyn Topic> {
        match self {
            Node::Signal(signal) => Some(signal),
            Node::Computer(computer) => Some(computer),
            Node::Effector(_) => None,
        }
    }

    /// Kind label for diagnostics.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Signal(_) => "signal",
            Node::Computer(_) => "computer",
            Node::Effector(_) => "effector",
        }
    }
}
