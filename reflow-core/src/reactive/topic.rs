//! Topic Capability
//!
//! The shared subscribe/unsubscribe contract implemented by both signals and
//! computers. Computers and effectors register against either kind through
//! this trait without distinguishing them.

use crate::graph::NodeId;

/// A node that other nodes can subscribe to.
pub trait Topic {
    /// Append a subscriber. Subscribers are notified in registration order.
    fn subscribe(&mut self, subscriber: NodeId);

    /// Remove a subscriber. Unknown subscribers are ignored.
    fn unsubscribe(&mut self, subscriber: NodeId);
}
