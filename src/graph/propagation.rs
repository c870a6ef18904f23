use super::edge::Edge;
use super::handles::*;
use super::port::*;
use crate::bits::{mask, Value};
use crate::data_structures::Arena;
use smallvec::SmallVec;
use tracing::trace;

/// Why a node could not read one of its inputs.
///
/// The [Circuit](super::Circuit) turns these into [SimError](crate::SimError)s carrying the node's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortFault {
    NotConnected { port: PortName },
    WidthMismatch { port: PortName, expected: u8, actual: u8 },
}

/// What one evaluation of a node did besides writing edges.
#[derive(Debug, Default)]
pub(super) struct Effects {
    /// Destinations of every edge whose value changed.
    pub downstream: SmallVec<[NodeId; 4]>,
    /// Every edge whose value changed, with the value it held before the write.
    pub changed_edges: SmallVec<[(EdgeId, Option<Value>); 4]>,
    /// Value pushed into another node, used by input proxies.
    pub forwarded: Option<(NodeId, Value)>,
    /// Set when an output node recorded a new value, holds the value it had before.
    pub observed: Option<Option<Value>>,
}

/// The view of the circuit a node gets while it propagates: its own ports and the edges behind them.
///
/// Reads are width checked against the port's declared width, writes are masked to the port's width
/// and fanned out to every bound edge.
pub struct Propagation<'a> {
    inputs: &'a InputPorts,
    outputs: &'a OutputPorts,
    edges: &'a mut Arena<EdgeId, Edge>,
    effects: Effects,
}

impl<'a> Propagation<'a> {
    pub(super) fn new(
        inputs: &'a InputPorts,
        outputs: &'a OutputPorts,
        edges: &'a mut Arena<EdgeId, Edge>,
    ) -> Self {
        Self {
            inputs,
            outputs,
            edges,
            effects: Default::default(),
        }
    }

    pub(super) fn finish(self) -> Effects {
        self.effects
    }

    /// Returns the value on `port`, failing if nothing is bound to it or its width is wrong.
    pub fn read(&self, port: &str) -> Result<Value, PortFault> {
        match self.inputs.get_key_value(port) {
            Some((name, input)) => self.read_port(name, input),
            None => Err(PortFault::NotConnected { port: port.into() }),
        }
    }

    /// Returns the value on the `index`th input port.
    pub fn read_at(&self, index: usize) -> Result<Value, PortFault> {
        match self.inputs.get_index(index) {
            Some((name, input)) => self.read_port(name, input),
            None => Err(PortFault::NotConnected { port: index.into() }),
        }
    }

    /// Like [Propagation::read] but returns `default` when `port` is not bound.
    pub fn read_or(&self, port: &str, default: Value) -> Result<Value, PortFault> {
        if self.is_connected(port) {
            self.read(port)
        } else {
            Ok(default)
        }
    }

    pub fn is_connected(&self, port: &str) -> bool {
        self.inputs
            .get(port)
            .map_or(false, |input| input.edge.is_some())
    }

    /// Number of input ports.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    fn read_port(&self, name: &PortName, input: &InputPort) -> Result<Value, PortFault> {
        let edge = match input.edge {
            Some(edge) => &self.edges[edge],
            None => {
                return Err(PortFault::NotConnected { port: name.clone() });
            }
        };
        if let (Some(expected), Some(actual)) = (input.bits, edge.bits()) {
            if expected != actual {
                return Err(PortFault::WidthMismatch {
                    port: name.clone(),
                    expected,
                    actual,
                });
            }
        }
        Ok(edge.value())
    }

    /// Writes `value` to every edge bound to `port`.
    pub fn write(&mut self, port: &str, value: Value) {
        let outputs = self.outputs;
        if let Some(output) = outputs.get(port) {
            self.fan_out(output, value);
        } else {
            debug_assert!(false, "write to undeclared output port {}", port);
        }
    }

    /// Writes `value` to every edge bound to the `index`th output port.
    pub fn write_at(&mut self, index: usize, value: Value) {
        let outputs = self.outputs;
        if let Some((_, output)) = outputs.get_index(index) {
            self.fan_out(output, value);
        }
    }

    /// Writes `value` to every output port.
    pub fn write_all(&mut self, value: Value) {
        let outputs = self.outputs;
        for output in outputs.values() {
            self.fan_out(output, value);
        }
    }

    fn fan_out(&mut self, output: &OutputPort, value: Value) {
        let value = mask(value, output.bits);
        for &id in &output.edges {
            let edge = &mut self.edges[id];
            let before = edge.resolved();
            let dest = edge.write(value, output.bits);
            if before != Some(value) {
                trace!(edge = %id, value, "edge changed");
                self.effects.downstream.push(dest);
                self.effects.changed_edges.push((id, before));
            }
        }
    }

    /// Sets the value of another node, which gets queued for evaluation.
    pub fn forward(&mut self, node: NodeId, value: Value) {
        self.effects.forwarded = Some((node, value));
    }

    /// Records that an output node changed, `previous` is what it held before this evaluation.
    pub fn observe(&mut self, previous: Option<Value>) {
        self.effects.observed = Some(previous);
    }
}
