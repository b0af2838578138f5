//! Processor Commands
//!
//! Every graph operation is expressed as one variant of [`Command`] and
//! travels through the bounded queue to the worker. Fire-and-forget variants
//! carry no reply; synchronous variants carry a one-shot reply channel the
//! worker writes to exactly once after applying the command.

use crossbeam_channel::Sender;

use crate::error::GraphError;
use crate::graph::NodeId;
use crate::reactive::{EffectFn, EffectorFn, EvalFn, Value};

pub(crate) enum Command {
    CreateSignal {
        id: NodeId,
        value: Value,
        effect: Option<EffectFn>,
    },
    SetSignal {
        id: NodeId,
        value: Value,
    },
    GetSignal {
        id: NodeId,
        reply: Sender<Option<Value>>,
    },
    CreateComputer {
        id: NodeId,
        evaluate: EvalFn,
        effect: Option<EffectFn>,
        parents: Vec<NodeId>,
    },
    GetComputer {
        id: NodeId,
        reply: Sender<Option<Value>>,
    },
    RemoveComputer {
        id: NodeId,
        reply: Sender<Result<(), GraphError>>,
    },
    CreateEffector {
        id: NodeId,
        callback: EffectorFn,
        parents: Vec<NodeId>,
    },
    RemoveEffector {
        id: NodeId,
    },
    UnsubscribeEffector {
        id: NodeId,
        parent: NodeId,
    },
    /// Drains the queue: every command enqueued before it is applied first,
    /// then the worker clears the registry and exits.
    Shutdown,
}
