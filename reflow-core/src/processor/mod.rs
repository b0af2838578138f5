//! Processor
//!
//! The processor is the single serializing execution context of the engine.
//! It owns the registry through one dedicated worker thread; every mutation
//! and read is a command placed on a bounded FIFO queue, giving total
//! ordering across all submitters without any lock around the graph.
//!
//! # Blocking behavior
//!
//! - Fire-and-forget operations (`set_signal`, creation, removal of
//!   effectors) return as soon as the command is accepted onto the queue, or
//!   block while the queue is full (backpressure; nothing is dropped while
//!   running).
//! - Read operations (`signal`, `computer`, `remove_computer`) block the
//!   caller on a one-shot reply channel until the worker has applied the
//!   command.
//!
//! # Id issuance
//!
//! Node ids come from an atomic counter and are returned before the creation
//! command has been applied. Operating on a not-yet-materialized id is a
//! silent no-op; callers that need the node to exist can interleave any
//! synchronous read, since the queue is FIFO.
//!
//! # Shutdown
//!
//! `stop()` is a one-way transition. It flips the running flag (rejecting
//! further submissions), enqueues a shutdown command behind all pending work
//! so the queue drains completely, and joins the worker, which clears the
//! registry before exiting. There is no restart.

mod command;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::error::GraphError;
use crate::graph::{Graph, NodeId};
use crate::reactive::Value;

use command::Command;

/// Default command queue capacity.
const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// Handle to the reactive engine. All operations are submitted through it.
///
/// # Example
///
/// ```rust,ignore
/// let processor = Processor::new();
/// let first = processor.create_signal(Value::new("John".to_string()));
/// let last = processor.create_signal(Value::new("Smith".to_string()));
///
/// let full = processor.create_computer(
///     move |g| {
///         let f = g.signal_as::<String>(first).unwrap_or_default();
///         let l = g.signal_as::<String>(last).unwrap_or_default();
///         Value::new(format!("{f}.{l}"))
///     },
///     vec![first, last],
/// );
///
/// assert_eq!(processor.computer(full).unwrap().get::<String>().unwrap(), "John.Smith");
/// ```
pub struct Processor {
    /// Monotonic id source. Ids are issued ahead of materialization and
    /// never reused.
    next_id: AtomicU64,

    /// Running/Stopped flag. One-way transition.
    running: AtomicBool,

    tx: Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Processor {
    /// Start a processor with the default queue capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Start a processor with a bounded command queue of the given capacity.
    /// Submitters block while the queue is full.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        let worker = std::thread::Builder::new()
            .name("reflow-processor".to_string())
            .spawn(move || run_worker(rx))
            .expect("failed to spawn processor worker");

        Self {
            next_id: AtomicU64::new(1),
            running: AtomicBool::new(true),
            tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    /// Create a signal holding `value`. Returns its id immediately; the node
    /// is materialized asynchronously by the worker.
    pub fn create_signal(&self, value: Value) -> NodeId {
        self.create_signal_inner(value, None)
    }

    /// Create a signal with a change listener, invoked with the new value on
    /// every `set_signal` after subscribers have been notified.
    pub fn create_signal_with<F>(&self, value: Value, effect: F) -> NodeId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.create_signal_inner(value, Some(Arc::new(effect)))
    }

    fn create_signal_inner(
        &self,
        value: Value,
        effect: Option<crate::reactive::EffectFn>,
    ) -> NodeId {
        let id = self.allocate_id();
        self.submit(Command::CreateSignal { id, value, effect });
        id
    }

    /// Store a new value, fire-and-forget. Invalidation is pushed to every
    /// subscriber within the worker step. Unknown ids are a silent no-op.
    pub fn set_signal(&self, id: NodeId, value: Value) {
        self.submit(Command::SetSignal { id, value });
    }

    /// Read a signal's current value, blocking until the worker answers.
    /// Yields `None` for unknown ids or after `stop()`.
    pub fn signal(&self, id: NodeId) -> Option<Value> {
        let (reply, rx) = bounded(1);
        if !self.try_send(Command::GetSignal { id, reply }) {
            return None;
        }
        rx.recv().ok().flatten()
    }

    /// Read a signal and downcast it in one step.
    pub fn signal_as<T: std::any::Any + Clone>(&self, id: NodeId) -> Option<T> {
        self.signal(id).and_then(|value| value.get::<T>())
    }

    // ------------------------------------------------------------------
    // Computers
    // ------------------------------------------------------------------

    /// Create a computer over the declared parents (signal or computer ids).
    ///
    /// The evaluation closure runs inside the worker and may read any node
    /// through the [`Graph`] it receives. Returns the id immediately.
    pub fn create_computer<F>(&self, evaluate: F, parents: Vec<NodeId>) -> NodeId
    where
        F: Fn(&mut Graph) -> Value + Send + Sync + 'static,
    {
        self.create_computer_inner(Arc::new(evaluate), None, parents)
    }

    /// Create a computer with a listener invoked each time a fresh value is
    /// computed.
    pub fn create_computer_with<F, E>(&self, evaluate: F, effect: E, parents: Vec<NodeId>) -> NodeId
    where
        F: Fn(&mut Graph) -> Value + Send + Sync + 'static,
        E: Fn(&Value) + Send + Sync + 'static,
    {
        self.create_computer_inner(Arc::new(evaluate), Some(Arc::new(effect)), parents)
    }

    fn create_computer_inner(
        &self,
        evaluate: crate::reactive::EvalFn,
        effect: Option<crate::reactive::EffectFn>,
        parents: Vec<NodeId>,
    ) -> NodeId {
        let id = self.allocate_id();
        self.submit(Command::CreateComputer {
            id,
            evaluate,
            effect,
            parents,
        });
        id
    }

    /// Read a computer's value, blocking until the worker answers. A dirty
    /// computer is recomputed (dependency-first) inside this call; a clean
    /// one returns its cache without evaluating.
    pub fn computer(&self, id: NodeId) -> Option<Value> {
        let (reply, rx) = bounded(1);
        if !self.try_send(Command::GetComputer { id, reply }) {
            return None;
        }
        rx.recv().ok().flatten()
    }

    /// Read a computer and downcast it in one step.
    pub fn computer_as<T: std::any::Any + Clone>(&self, id: NodeId) -> Option<T> {
        self.computer(id).and_then(|value| value.get::<T>())
    }

    /// Remove a computer, blocking until the worker answers.
    ///
    /// Fails with [`GraphError::HasSubscribers`] while other nodes subscribe
    /// to it; unknown ids succeed as a no-op.
    pub fn remove_computer(&self, id: NodeId) -> Result<(), GraphError> {
        let (reply, rx) = bounded(1);
        if !self.try_send(Command::RemoveComputer { id, reply }) {
            return Err(GraphError::Stopped);
        }
        rx.recv().unwrap_or(Err(GraphError::Stopped))
    }

    // ------------------------------------------------------------------
    // Effectors
    // ------------------------------------------------------------------

    /// Create an effector bound to the declared parents exactly as given (no
    /// flattening through intermediate computers). The callback runs inside
    /// the worker on every invalidation of any bound parent.
    pub fn create_effector<F>(&self, callback: F, parents: Vec<NodeId>) -> NodeId
    where
        F: Fn(&mut Graph) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.submit(Command::CreateEffector {
            id,
            callback: Arc::new(callback),
            parents,
        });
        id
    }

    /// Remove an effector, fire-and-forget. Unknown ids are a no-op.
    pub fn remove_effector(&self, id: NodeId) {
        self.submit(Command::RemoveEffector { id });
    }

    /// Detach an effector from a single parent without removing it.
    pub fn unsubscribe_effector(&self, id: NodeId, parent: NodeId) {
        self.submit(Command::UnsubscribeEffector { id, parent });
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Whether the processor still accepts commands.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the processor: reject further submissions, drain every command
    /// already queued, clear the registry, and join the worker. Idempotent.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            let _ = self.tx.send(Command::Shutdown);
            if let Some(worker) = self.worker.lock().take() {
                let _ = worker.join();
            }
        }
    }

    fn allocate_id(&self) -> NodeId {
        NodeId::from(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Enqueue a fire-and-forget command, blocking on a full queue. Silently
    /// dropped once stopped.
    fn submit(&self, command: Command) {
        if !self.is_running() {
            return;
        }
        let _ = self.tx.send(command);
    }

    /// Enqueue a command that expects a reply. Returns false once stopped.
    fn try_send(&self, command: Command) -> bool {
        if !self.is_running() {
            return false;
        }
        self.tx.send(command).is_ok()
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The worker loop: owns the graph, applies commands in strict FIFO arrival
/// order, writes each reply exactly once.
fn run_worker(rx: Receiver<Command>) {
    debug!("processor worker started");
    let mut graph = Graph::new();

    for command in rx {
        match command {
            Command::CreateSignal { id, value, effect } => graph.insert_signal(id, value, effect),
            Command::SetSignal { id, value } => graph.set_signal(id, value),
            Command::GetSignal { id, reply } => {
                let _ = reply.send(graph.signal(id));
            }
            Command::CreateComputer {
                id,
                evaluate,
                effect,
                parents,
            } => graph.insert_computer(id, evaluate, effect, parents),
            Command::GetComputer { id, reply } => {
                let _ = reply.send(graph.computer(id));
            }
            Command::RemoveComputer { id, reply } => {
                let _ = reply.send(graph.remove_computer(id));
            }
            Command::CreateEffector {
                id,
                callback,
                parents,
            } => graph.insert_effector(id, callback, parents),
            Command::RemoveEffector { id } => graph.remove_effector(id),
            Command::UnsubscribeEffector { id, parent } => graph.unsubscribe_effector(id, parent),
            Command::Shutdown => break,
        }
    }

    graph.clear();
    debug!("processor worker stopped");
}
