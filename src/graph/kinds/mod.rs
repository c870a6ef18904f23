//! The closed catalog of node behaviours.
//!
//! Every kind is a plain value transform: it reads its inputs through a [Propagation], computes and writes
//! its outputs. Queueing, masking and change detection live in the [Circuit](super::Circuit).
use super::handles::NodeId;
use super::port::PortLayout;
use super::propagation::{PortFault, Propagation};
use crate::bits::Value;
use std::collections::HashMap;
use strum_macros::IntoStaticStr;

mod arithmetic;
mod gate;
mod io;
mod memory;
mod plexer;
mod proxy;
mod wiring;
pub use arithmetic::*;
pub use gate::*;
pub use io::*;
pub use memory::*;
pub use plexer::*;
pub use proxy::*;
pub use wiring::*;

/// The part a node plays in its circuit.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Role {
    /// Externally driven, seeds every pass.
    Input,
    /// Fixed value, seeds every pass.
    Constant,
    /// Toggled by clocked ticks.
    Clock,
    /// Observed for stabilization and reported to the event sink.
    Output,
    Internal,
}

/// Behaviour shared by every node kind.
pub trait Behavior {
    /// Declared width of the node.
    fn bits(&self) -> u8;

    /// The ports the node exposes.
    fn layout(&self) -> PortLayout;

    /// Reads inputs, computes, writes outputs.
    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault>;

    fn role(&self) -> Role {
        Role::Internal
    }

    /// Observable state, for nodes that have one.
    fn value(&self) -> Option<Value> {
        None
    }

    /// Rewrites references to other nodes after the node was cloned into another circuit.
    fn remap(&mut self, _nodes: &HashMap<NodeId, NodeId>) {}
}

/// Declares [NodeKind] with one variant per kind plus the dispatch to [Behavior].
macro_rules! node_kinds {
    ($($kind:ident),* $(,)?) => {
        /// A node's kind, fixed at construction.
        #[derive(Debug, Clone, IntoStaticStr)]
        pub enum NodeKind {
            $($kind($kind),)*
        }

        $(
            impl From<$kind> for NodeKind {
                fn from(kind: $kind) -> Self {
                    NodeKind::$kind(kind)
                }
            }
        )*

        impl NodeKind {
            pub(crate) fn behavior(&self) -> &dyn Behavior {
                match self {
                    $(NodeKind::$kind(kind) => kind,)*
                }
            }

            pub(crate) fn behavior_mut(&mut self) -> &mut dyn Behavior {
                match self {
                    $(NodeKind::$kind(kind) => kind,)*
                }
            }
        }
    };
}

node_kinds!(
    Input,
    Constant,
    Clock,
    Output,
    Gate,
    Adder,
    Subtractor,
    Multiplier,
    Divider,
    Comparator,
    Negator,
    SignExtender,
    BitCounter,
    Shifter,
    Multiplexer,
    Decoder,
    PriorityEncoder,
    Register,
    Ram,
    Rom,
    Splitter,
    Merger,
    Tunnel,
    InputProxy,
    OutputProxy,
);

impl NodeKind {
    /// Name of the kind, gates are named after their operation.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Gate(gate) => gate.op().into(),
            other => other.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.behavior().role()
    }

    pub fn bits(&self) -> u8 {
        self.behavior().bits()
    }
}
