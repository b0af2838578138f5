//! Reactive Primitives
//!
//! This module implements the three node kinds of the dataflow engine:
//! signals, computers, and effectors.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state, the root of the dependency
//! graph. Setting a signal stores the new value and pushes invalidation to
//! every subscriber in registration order.
//!
//! ## Computers
//!
//! A Computer is a derived value that caches its result. Its dependencies are
//! declared explicitly at creation and flattened down to root signals, so
//! invalidation reaches it in one hop. Recomputation is pull-only: it happens
//! inside the next read, never during the push phase.
//!
//! ## Effectors
//!
//! An Effector is a side-effecting subscriber with no cached value. It fires
//! immediately whenever any of its declared parents is invalidated.
//!
//! # Push-then-pull
//!
//! When a signal changes, the "dirty" state propagates eagerly through the
//! downstream subgraph (push) while every recomputation is deferred until a
//! value is explicitly requested (pull). This favors workloads where
//! producers are fast and only a subset of derived values is ever read.

mod computer;
mod effector;
mod signal;
mod topic;
mod value;

use std::sync::Arc;

use crate::graph::Graph;

pub use computer::Computer;
pub use effector::Effector;
pub use signal::Signal;
pub use topic::Topic;
pub use value::Value;

pub(crate) use computer::DependencyPlan;

/// Listener invoked with a freshly stored or computed value.
pub type EffectFn = Arc<dyn Fn(&Value) + Send + Sync>;

/// Evaluation closure of a computer. Runs inside the worker with full access
/// to the graph so it can read its parents.
pub type EvalFn = Arc<dyn Fn(&mut Graph) -> Value + Send + Sync>;

/// Callback of an effector. Runs inside the worker on every invalidation of a
/// bound parent.
pub type EffectorFn = Arc<dyn Fn(&mut Graph) + Send + Sync>;
