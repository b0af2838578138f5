//! Dependency Graph
//!
//! This module implements the id-indexed node registry and the push/pull
//! propagation machinery.
//!
//! # Overview
//!
//! The graph is a DAG whose roots are signals and whose interior nodes are
//! computers; effectors hang off either kind as leaves. Edges are recorded as
//! subscriber lists on the parent side, flattened so that every computer
//! subscribes directly to the root signals it transitively depends on.
//!
//! # Design Decisions
//!
//! 1. The registry is owned by exactly one worker thread. There are no locks
//!    around it; serialization through the command queue is the whole
//!    concurrency story.
//!
//! 2. Dependencies are flattened at construction time rather than discovered
//!    at evaluation time. This trades dynamic dependency tracking for a
//!    one-hop push phase and a precomputed, dependency-first pull order.
//!
//! 3. The graph is indexed by node id for O(1) lookups; ids are allocated
//!    ahead of materialization, so lookups on fresh ids may legitimately
//!    miss and resolve as no-ops.

mod node;
mod store;

pub use node::NodeId;
pub use store::Graph;

pub(crate) use node::Node;
