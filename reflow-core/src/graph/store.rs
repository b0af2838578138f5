//! Graph Registry
//!
//! The [`Graph`] owns every node, indexed by id. It is created inside the
//! processor's worker thread and never leaves it: all external access goes
//! through the command queue, which is the engine's only concurrency-safety
//! mechanism. Evaluation closures and effector callbacks receive `&mut Graph`
//! because they run inside the worker.
//!
//! # Propagation
//!
//! Setting a signal stores the new value and walks the subscriber list in
//! registration order (push phase): computers are marked dirty and their own
//! subscribers notified in turn, effectors run immediately. No value is
//! recomputed during the push. Reading a computer (pull phase) forces its
//! recorded evaluation order front to back, guaranteeing dependency-first
//! evaluation, then evaluates the node itself and caches the result.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use crate::error::GraphError;
use crate::reactive::{
    Computer, DependencyPlan, EffectFn, EffectorFn, Effector, EvalFn, Signal, Topic, Value,
};

use super::node::{Node, NodeId};

/// The id-indexed node registry, owned exclusively by the worker.
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    /// Read a signal's current value. Unknown or non-signal ids yield `None`.
    pub fn signal(&self, id: NodeId) -> Option<Value> {
        match self.nodes.get(&id) {
            Some(Node::Signal(signal)) => Some(signal.value.clone()),
            _ => None,
        }
    }

    /// Read a signal and downcast it in one step.
    pub fn signal_as<T: std::any::Any + Clone>(&self, id: NodeId) -> Option<T> {
        self.signal(id).and_then(|value| value.get::<T>())
    }

    /// Store a new value and push invalidation downstream.
    ///
    /// Subscribers are notified in registration order, then the signal's own
    /// effect fires with the new value. Unknown ids are a silent no-op.
    pub fn set_signal(&mut self, id: NodeId, value: Value) {
        let (subscribers, effect) = match self.nodes.get_mut(&id) {
            Some(Node::Signal(signal)) => {
                signal.value = value.clone();
                (signal.subscribers.clone(), signal.effect.clone())
            }
            _ => return,
        };
        self.notify(&subscribers);
        if let Some(effect) = effect {
            effect(&value);
        }
    }

    pub(crate) fn insert_signal(&mut self, id: NodeId, value: Value, effect: Option<EffectFn>) {
        self.nodes
            .insert(id, Node::Signal(Signal::new(id, value, effect)));
    }

    // ------------------------------------------------------------------
    // Computers
    // ------------------------------------------------------------------

    /// Read a computer's value, recomputing if it is dirty.
    ///
    /// A clean computer returns its cache without invoking `evaluate`. A
    /// dirty one first forces every still-dirty ancestor in its recorded
    /// evaluation order, then evaluates itself, caches the result, clears the
    /// dirty flag, and fires its effect. Unknown or non-computer ids yield
    /// `None`.
    pub fn computer(&mut self, id: NodeId) -> Option<Value> {
        let eval_order = match self.nodes.get(&id) {
            Some(Node::Computer(computer)) => {
                if !computer.dirty {
                    return computer.value.clone();
                }
                computer.eval_order.clone()
            }
            _ => return None,
        };
        for ancestor in eval_order {
            self.force(ancestor);
        }
        self.force(id)
    }

    /// Read a computer and downcast it in one step.
    pub fn computer_as<T: std::any::Any + Clone>(&mut self, id: NodeId) -> Option<T> {
        self.computer(id).and_then(|value| value.get::<T>())
    }

    /// Evaluate one dirty computer, assuming its ancestors are already clean.
    fn force(&mut self, id: NodeId) -> Option<Value> {
        let evaluate = match self.nodes.get(&id) {
            Some(Node::Computer(computer)) => {
                if !computer.dirty {
                    return computer.value.clone();
                }
                Arc::clone(&computer.evaluate)
            }
            _ => return None,
        };
        let value = evaluate(self);
        let effect = match self.nodes.get_mut(&id) {
            Some(Node::Computer(computer)) => {
                computer.value = Some(value.clone());
                computer.dirty = false;
                computer.effect.clone()
            }
            // Removed while evaluating; nothing to cache.
            _ => None,
        };
        if let Some(effect) = effect {
            effect(&value);
        }
        Some(value)
    }

    /// Materialize a computer: flatten its declared parents into root signals
    /// and a dependency-first evaluation order, then subscribe to every root.
    ///
    /// A parent id that is not yet materialized is skipped silently. A parent
    /// that is an effector is a malformed declaration: construction aborts
    /// and the node is never inserted.
    pub(crate) fn insert_computer(
        &mut self,
        id: NodeId,
        evaluate: EvalFn,
        effect: Option<EffectFn>,
        parents: Vec<NodeId>,
    ) {
        let mut plan = DependencyPlan::new();
        for &parent in &parents {
            match self.nodes.get(&parent) {
                Some(Node::Signal(_)) => plan.add_signal(parent),
                Some(Node::Computer(computer)) => plan.add_computer(parent, computer),
                Some(other) => {
                    error!(
                        node = %id,
                        parent = %parent,
                        kind = other.kind(),
                        "computer parent must be a signal or computer"
                    );
                    return;
                }
                None => {}
            }
        }
        plan.finish();

        for &root in &plan.roots {
            if let Some(Node::Signal(signal)) = self.nodes.get_mut(&root) {
                signal.subscribe(id);
            }
        }
        self.nodes.insert(
            id,
            Node::Computer(Computer::new(id, plan, parents, evaluate, effect)),
        );
    }

    /// Remove a computer.
    ///
    /// Fails while the node still has subscribers. Removal unregisters the
    /// node from every parent through the topic capability. Unknown ids are a
    /// silent no-op.
    pub(crate) fn remove_computer(&mut self, id: NodeId) -> Result<(), GraphError> {
        match self.nodes.get(&id) {
            Some(Node::Computer(computer)) => {
                if !computer.subscribers.is_empty() {
                    return Err(GraphError::HasSubscribers(id));
                }
            }
            _ => return Ok(()),
        }
        if let Some(Node::Computer(computer)) = self.nodes.remove(&id) {
            for parent in computer.root_signals.iter().chain(computer.parents.iter()) {
                if let Some(topic) = self.nodes.get_mut(parent).and_then(Node::as_topic_mut) {
                    topic.unsubscribe(id);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Effectors
    // ------------------------------------------------------------------

    /// Materialize an effector, subscribing it to each declared parent
    /// exactly as given. Missing parents are skipped; an effector-typed
    /// parent aborts construction.
    pub(crate) fn insert_effector(
        &mut self,
        id: NodeId,
        callback: EffectorFn,
        parents: Vec<NodeId>,
    ) {
        for &parent in &parents {
            if let Some(Node::Effector(_)) = self.nodes.get(&parent) {
                error!(
                    node = %id,
                    parent = %parent,
                    "effector parent must be a signal or computer"
                );
                return;
            }
        }
        for &parent in &parents {
            if let Some(topic) = self.nodes.get_mut(&parent).and_then(Node::as_topic_mut) {
                topic.subscribe(id);
            }
        }
        self.nodes
            .insert(id, Node::Effector(Effector::new(id, parents, callback)));
    }

    /// Remove an effector, unsubscribing it from each declared parent.
    /// Unknown ids are a no-op.
    pub(crate) fn remove_effector(&mut self, id: NodeId) {
        if !matches!(self.nodes.get(&id), Some(Node::Effector(_))) {
            return;
        }
        if let Some(Node::Effector(effector)) = self.nodes.remove(&id) {
            for parent in &effector.parents {
                if let Some(topic) = self.nodes.get_mut(parent).and_then(Node::as_topic_mut) {
                    topic.unsubscribe(id);
                }
            }
        }
    }

    /// Detach an effector from a single parent without removing the node.
    pub(crate) fn unsubscribe_effector(&mut self, id: NodeId, parent: NodeId) {
        if let Some(topic) = self.nodes.get_mut(&parent).and_then(Node::as_topic_mut) {
            topic.unsubscribe(id);
        }
    }

    // ------------------------------------------------------------------
    // Propagation
    // ------------------------------------------------------------------

    /// Push phase: invalidate each subscriber in order.
    ///
    /// Computers are marked dirty and their own subscribers notified in turn;
    /// effectors run immediately. Computers never subscribe to other
    /// computers (dependencies are flattened to root signals), so the
    /// recursion is at most one level deep.
    fn notify(&mut self, subscribers: &[NodeId]) {
        for &subscriber in subscribers {
            match self.nodes.get_mut(&subscriber) {
                Some(Node::Computer(computer)) => {
                    computer.dirty = true;
                    let downstream = computer.subscribers.clone();
                    self.notify(&downstream);
                }
                Some(Node::Effector(effector)) => {
                    let callback = Arc::clone(&effector.callback);
                    callback(self);
                }
                _ => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of subscribers on a signal or computer.
    pub fn subscriber_count(&self, id: NodeId) -> Option<usize> {
        match self.nodes.get(&id)? {
            Node::Signal(signal) => Some(signal.subscriber_count()),
            Node::Computer(computer) => Some(computer.subscriber_count()),
            Node::Effector(_) => None,
        }
    }

    /// Whether the id is materialized in the registry.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Total number of materialized nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    fn id(raw: u64) -> NodeId {
        NodeId::from(raw)
    }

    #[test]
    fn signal_read_after_write() {
        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(1314i64), None);

        assert_eq!(graph.signal_as::<i64>(id(1)), Some(1314));

        graph.set_signal(id(1), Value::new(2321i64));
        assert_eq!(graph.signal_as::<i64>(id(1)), Some(2321));
    }

    #[test]
    fn unknown_ids_resolve_to_no_ops() {
        let mut graph = Graph::new();

        assert!(graph.signal(id(99)).is_none());
        assert!(graph.computer(id(99)).is_none());
        graph.set_signal(id(99), Value::new(1i64));
        graph.remove_effector(id(99));
        assert_eq!(graph.remove_computer(id(99)), Ok(()));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn signal_effect_fires_on_every_set() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut graph = Graph::new();
        graph.insert_signal(
            id(1),
            Value::new(0i64),
            Some(Arc::new(move |value: &Value| {
                seen_clone.lock().unwrap().push(value.get::<i64>().unwrap());
            })),
        );

        graph.set_signal(id(1), Value::new(10i64));
        graph.set_signal(id(1), Value::new(20i64));

        assert_eq!(*seen.lock().unwrap(), vec![10, 20]);
    }

    #[test]
    fn computer_memoizes_until_invalidated() {
        let calls = Arc::new(AtomicI32::new(0));
        let calls_clone = calls.clone();

        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(5i64), None);
        graph.insert_computer(
            id(2),
            Arc::new(move |g: &mut Graph| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Value::new(g.signal_as::<i64>(id(1)).unwrap() * 2)
            }),
            None,
            vec![id(1)],
        );

        assert_eq!(graph.computer_as::<i64>(id(2)), Some(10));
        assert_eq!(graph.computer_as::<i64>(id(2)), Some(10));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Push phase marks dirty but never recomputes.
        graph.set_signal(id(1), Value::new(7i64));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Pull recomputes exactly once.
        assert_eq!(graph.computer_as::<i64>(id(2)), Some(14));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn flattening_subscribes_grandchild_to_root() {
        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(1i64), None);
        graph.insert_computer(
            id(2),
            Arc::new(|g: &mut Graph| Value::new(g.signal_as::<i64>(id(1)).unwrap() + 1)),
            None,
            vec![id(1)],
        );
        graph.insert_computer(
            id(3),
            Arc::new(|g: &mut Graph| Value::new(g.computer_as::<i64>(id(2)).unwrap() + 1)),
            None,
            vec![id(2)],
        );

        // Both computers subscribe to the root signal directly.
        assert_eq!(graph.subscriber_count(id(1)), Some(2));

        assert_eq!(graph.computer_as::<i64>(id(3)), Some(3));

        // A root change reaches the grandchild even though the intermediate
        // computer is never read in between.
        graph.set_signal(id(1), Value::new(10i64));
        assert_eq!(graph.computer_as::<i64>(id(3)), Some(12));
    }

    #[test]
    fn forcing_is_dependency_first() {
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(1i64), None);

        let order_c1 = order.clone();
        graph.insert_computer(
            id(2),
            Arc::new(move |g: &mut Graph| {
                order_c1.lock().unwrap().push("c1");
                Value::new(g.signal_as::<i64>(id(1)).unwrap() + 1)
            }),
            None,
            vec![id(1)],
        );
        let order_c2 = order.clone();
        graph.insert_computer(
            id(3),
            Arc::new(move |g: &mut Graph| {
                order_c2.lock().unwrap().push("c2");
                Value::new(g.computer_as::<i64>(id(2)).unwrap() + 1)
            }),
            None,
            vec![id(2)],
        );

        graph.computer(id(3));
        graph.set_signal(id(1), Value::new(5i64));
        graph.computer(id(3));

        assert_eq!(*order.lock().unwrap(), vec!["c1", "c2", "c1", "c2"]);
    }

    #[test]
    fn computer_effect_fires_with_fresh_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(3i64), None);
        graph.insert_computer(
            id(2),
            Arc::new(|g: &mut Graph| Value::new(g.signal_as::<i64>(id(1)).unwrap() * 10)),
            Some(Arc::new(move |value: &Value| {
                seen_clone.lock().unwrap().push(value.get::<i64>().unwrap());
            })),
            vec![id(1)],
        );

        graph.computer(id(2));
        graph.computer(id(2)); // cached, no effect
        graph.set_signal(id(1), Value::new(4i64));
        graph.computer(id(2));

        assert_eq!(*seen.lock().unwrap(), vec![30, 40]);
    }

    #[test]
    fn effector_fires_per_set_observing_both_parents() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(1i64), None);
        graph.insert_signal(id(2), Value::new(2i64), None);
        graph.insert_effector(
            id(3),
            Arc::new(move |g: &mut Graph| {
                let pair = (
                    g.signal_as::<i64>(id(1)).unwrap(),
                    g.signal_as::<i64>(id(2)).unwrap(),
                );
                seen_clone.lock().unwrap().push(pair);
            }),
            vec![id(1), id(2)],
        );

        graph.set_signal(id(1), Value::new(1314i64));
        graph.set_signal(id(2), Value::new(520i64));

        assert_eq!(*seen.lock().unwrap(), vec![(1314, 2), (1314, 520)]);
    }

    #[test]
    fn effector_on_computer_fires_even_while_dirty() {
        let fired = Arc::new(AtomicI32::new(0));
        let fired_clone = fired.clone();

        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(0i64), None);
        graph.insert_computer(
            id(2),
            Arc::new(|g: &mut Graph| Value::new(g.signal_as::<i64>(id(1)).unwrap())),
            None,
            vec![id(1)],
        );
        graph.insert_effector(
            id(3),
            Arc::new(move |_g: &mut Graph| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
            vec![id(2)],
        );

        // The computer is never read: it stays dirty, yet every upstream set
        // still reaches the effector.
        graph.set_signal(id(1), Value::new(1i64));
        graph.set_signal(id(1), Value::new(2i64));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn removal_refused_while_subscribed() {
        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(0i64), None);
        graph.insert_computer(
            id(2),
            Arc::new(|g: &mut Graph| Value::new(g.signal_as::<i64>(id(1)).unwrap())),
            None,
            vec![id(1)],
        );
        graph.insert_effector(id(3), Arc::new(|_g: &mut Graph| {}), vec![id(2)]);

        assert_eq!(
            graph.remove_computer(id(2)),
            Err(GraphError::HasSubscribers(id(2)))
        );
        assert!(graph.contains(id(2)));

        graph.remove_effector(id(3));
        assert_eq!(graph.remove_computer(id(2)), Ok(()));
        assert!(!graph.contains(id(2)));

        // The former parent's subscriber list shrank back to empty.
        assert_eq!(graph.subscriber_count(id(1)), Some(0));
    }

    #[test]
    fn malformed_parent_aborts_construction() {
        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(0i64), None);
        graph.insert_effector(id(2), Arc::new(|_g: &mut Graph| {}), vec![id(1)]);

        // An effector is not a valid computer parent.
        graph.insert_computer(
            id(3),
            Arc::new(|_g: &mut Graph| Value::new(0i64)),
            None,
            vec![id(2)],
        );
        assert!(!graph.contains(id(3)));

        // Nor a valid effector parent.
        graph.insert_effector(id(4), Arc::new(|_g: &mut Graph| {}), vec![id(2)]);
        assert!(!graph.contains(id(4)));
    }

    #[test]
    fn unsubscribe_effector_detaches_one_parent() {
        let fired = Arc::new(AtomicI32::new(0));
        let fired_clone = fired.clone();

        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(0i64), None);
        graph.insert_signal(id(2), Value::new(0i64), None);
        graph.insert_effector(
            id(3),
            Arc::new(move |_g: &mut Graph| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
            vec![id(1), id(2)],
        );

        graph.unsubscribe_effector(id(3), id(1));

        graph.set_signal(id(1), Value::new(1i64)); // detached, no fire
        graph.set_signal(id(2), Value::new(1i64)); // still bound
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn not_yet_materialized_parent_is_skipped() {
        let mut graph = Graph::new();
        graph.insert_signal(id(1), Value::new(2i64), None);

        // id(9) was issued but its creation command has not been applied.
        graph.insert_computer(
            id(2),
            Arc::new(|g: &mut Graph| Value::new(g.signal_as::<i64>(id(1)).unwrap_or(0) * 2)),
            None,
            vec![id(1), id(9)],
        );

        assert!(graph.contains(id(2)));
        assert_eq!(graph.computer_as::<i64>(id(2)), Some(4));
    }
}
