//! Error Types
//!
//! The engine distinguishes three failure categories:
//!
//! 1. Structural errors: removing a computer that still has live subscribers.
//!    These are returned to the caller through the reply channel.
//!
//! 2. Silent no-ops: operating on an id that has not been materialized yet or
//!    has already been removed. These resolve to `None` / nothing, never an
//!    error, because id issuance is synchronous while creation is applied
//!    asynchronously by the worker.
//!
//! 3. Post-shutdown: fire-and-forget submissions after `stop()` are silently
//!    dropped; synchronous operations report [`GraphError::Stopped`].

use thiserror::Error;

use crate::graph::NodeId;

/// Errors reported by graph operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// The node cannot be removed while other nodes subscribe to it.
    #[error("node {0} still has active subscribers")]
    HasSubscribers(NodeId),

    /// The processor has been stopped; no further commands are accepted.
    #[error("processor is stopped")]
    Stopped,
}
