//! Reflow Core
//!
//! A fine-grained reactive dataflow engine built around a single serializing
//! worker:
//!
//! - **Signals**: mutable state cells, the roots of the dependency graph
//! - **Computers**: memoized derived values, recomputed lazily (pull)
//! - **Effectors**: side-effect subscribers, fired eagerly on invalidation
//! - **Processor**: one worker thread owning the id-indexed registry; every
//!   operation is a command on a bounded FIFO queue
//!
//! # Push-then-pull
//!
//! Setting a signal eagerly pushes a dirty flag through the downstream
//! subgraph without recomputing anything; recomputation happens only inside
//! the next read of a computer. Derived values that are never read are never
//! computed.
//!
//! # Concurrency model
//!
//! There are no locks around the graph. All callers interact with it through
//! message passing: fire-and-forget commands return once enqueued (blocking
//! only on a full queue), reads block on a one-shot reply channel. Commands
//! are applied in strict FIFO arrival order across all submitters.
//!
//! # Example
//!
//! ```rust,ignore
//! use reflow_core::{Processor, Value};
//!
//! let processor = Processor::new();
//!
//! let count = processor.create_signal(Value::new(0i64));
//! let doubled = processor.create_computer(
//!     move |g| Value::new(g.signal_as::<i64>(count).unwrap_or(0) * 2),
//!     vec![count],
//! );
//!
//! processor.set_signal(count, Value::new(5i64));
//! assert_eq!(processor.computer_as::<i64>(doubled), Some(10));
//! ```

pub mod error;
pub mod graph;
pub mod processor;
pub mod reactive;

pub use error::GraphError;
pub use graph::{Graph, NodeId};
pub use processor::Processor;
pub use reactive::{Topic, Value};
