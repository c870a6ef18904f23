use super::edge::Edge;
use super::handles::*;
use super::kinds::*;
use super::node::Node;
use super::propagation::{Effects, PortFault, Propagation};
use crate::bits::Value;
use crate::config::{SimConfig, TimeoutPolicy};
use crate::data_structures::{Arena, ArenaIndex, WorkQueue};
use crate::error::SimError;
use crate::events::{Event, EventSink, Severity, SimContext};
use crate::runner::{StopFlag, StopHandle};
use casey::pascal;
use concat_idents::concat_idents;
use indexmap::{IndexMap, IndexSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use GateOp::*;

/// Creates gatename, gatename2 and gatenamex constructors for every gate family.
/// gatename creates an unconnected gate, gatename2 and gatenamex create a gate wired to its sources.
macro_rules! gate_constructors {
    ($name:ident,$($rest:ident),*) => {
        gate_constructors!($name);
        gate_constructors!($($rest),*);
    };
    ($name:ident) => {
        gate_constructors!(
            $name,
            concat!(
                "Returns the [NodeId] of a new unconnected `",
                stringify!($name),
                "` gate with `inputs` inputs `bits` wide. Inputs are connected with [Circuit::connect]."
            )
        );
    };
    ($name:ident,$doc:expr) => {
        #[doc=$doc]
        pub fn $name<S: Into<String>>(&mut self, inputs: usize, bits: u8, label: S) -> NodeId {
            self.add(Gate::new(pascal!($name), inputs, bits), label)
        }

        concat_idents!(name2 = $name, 2 {
            /// Returns the [NodeId] of a new two input gate fed by `a` and `b`.
            ///
            /// The gate is as wide as the output port `a` names.
            pub fn name2<A: Into<Endpoint>, B: Into<Endpoint>, S: Into<String>>(
                &mut self,
                a: A,
                b: B,
                label: S,
            ) -> Result<NodeId, SimError> {
                let a = self.source(a.into())?;
                let bits = self.port_bits(&a);
                let gate = self.$name(2, bits, label);
                self.connect(a, gate.input(0))?;
                self.connect(b, gate.input(1))?;
                Ok(gate)
            }
        });

        concat_idents!(namex = $name, x {
            /// Returns the [NodeId] of a new gate with one input per source, the sources are taken in order
            /// from `iter`. The gate is as wide as the first source.
            pub fn namex<E: Into<Endpoint>, I: IntoIterator<Item = E>, S: Into<String>>(
                &mut self,
                iter: I,
                label: S,
            ) -> Result<NodeId, SimError> {
                let sources = iter
                    .into_iter()
                    .map(|e| self.source(e.into()))
                    .collect::<Result<Vec<_>, _>>()?;
                let bits = sources.first().map_or(1, |first| self.port_bits(first));
                let gate = self.$name(sources.len(), bits, label);
                for (i, source) in sources.into_iter().enumerate() {
                    self.connect(source, gate.input(i))?;
                }
                Ok(gate)
            }
        });
    };
}

/// Asserts that a single combinational [step](Circuit::step) settles without hitting the iteration cap.
#[macro_export]
macro_rules! assert_settled {
    ($circuit:expr) => {
        let pass = $circuit.step().expect("propagation failed");
        assert!(
            pass.converged,
            "Circuit didn't settle after {} iterations",
            pass.iterations
        );
    };
}

/// Result of one propagation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// Number of times the work queue was drained.
    pub iterations: usize,
    /// False if the pass hit the iteration cap and the circuit is still moving.
    pub converged: bool,
}

/// How a [Circuit::run] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The outputs stayed the same for the configured number of ticks.
    Stable { ticks: usize },
    /// The tick limit was reached with outputs still changing.
    Unstable { ticks: usize },
    /// [Circuit::stop] was called.
    Stopped { ticks: usize },
}

impl RunOutcome {
    pub fn is_stable(&self) -> bool {
        matches!(self, RunOutcome::Stable { .. })
    }

    pub fn ticks(&self) -> usize {
        match *self {
            RunOutcome::Stable { ticks }
            | RunOutcome::Unstable { ticks }
            | RunOutcome::Stopped { ticks } => ticks,
        }
    }
}

/// A graph of [Node]s connected by valued [Edge]s, and the engine that propagates values through it.
///
/// Nodes are created with the typed constructors ([Circuit::input], [Circuit::and2], [Circuit::add], ...),
/// wired with [Circuit::connect] and simulated with [Circuit::step], [Circuit::tick] or [Circuit::run].
///
/// Propagation is event driven: a pass seeds the work queue with every input, evaluates queued nodes
/// breadth first and queues the destinations of every edge whose value changed, until nothing changes
/// or the iteration cap is hit.
///
/// # Example
///
/// A half adder.
/// ```
/// # use logicgraph::*;
/// let mut c = Circuit::named("half_adder");
/// let a = c.input("a", 1);
/// let b = c.input("b", 1);
///
/// let sum = c.xor2(a, b, "xor").unwrap();
/// let carry = c.and2(a, b, "and").unwrap();
///
/// let sum_out = c.output("sum", 1);
/// let carry_out = c.output("carry", 1);
/// c.connect(sum, sum_out).unwrap();
/// c.connect(carry, carry_out).unwrap();
///
/// c.set_input(a, 1).unwrap();
/// assert!(c.run().unwrap().is_stable());
///
/// assert_eq!(c.output_value("sum"), Some(1));
/// assert_eq!(c.output_value("carry"), Some(0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    name: Option<Arc<str>>,
    pub(super) nodes: Arena<NodeId, Node>,
    pub(super) edges: Arena<EdgeId, Edge>,
    /// Inputs and constants, in creation order.
    inputs: Vec<NodeId>,
    clocks: Vec<NodeId>,
    /// Top level outputs, compared across ticks by [Circuit::run].
    outputs: Vec<NodeId>,
    /// Inputs set since the last pass.
    dirty: IndexSet<NodeId>,
    // Allocated here to avoid allocations in the propagation loop.
    queue: WorkQueue<NodeId>,
    /// Top level outputs changed by the running pass, with their value before it.
    changed_outputs: IndexMap<NodeId, Option<Value>>,
    /// Same for edges carrying an external id.
    changed_wires: IndexMap<EdgeId, Option<Value>>,
    pub(super) next_instance: usize,
    context: SimContext,
    stop: StopFlag,
}

impl Circuit {
    /// Returns an empty [Circuit] with the default [SimConfig].
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns an empty [Circuit] whose name is reported with its faults.
    pub fn named<S: Into<String>>(name: S) -> Self {
        let mut circuit = Self::new();
        circuit.name = Some(Arc::from(name.into()));
        circuit
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self::with_context(SimContext::new(config))
    }

    pub fn with_context(context: SimContext) -> Self {
        Self {
            context,
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn context(&self) -> &SimContext {
        &self.context
    }

    pub fn config(&self) -> &SimConfig {
        &self.context.config
    }

    pub fn set_config(&mut self, config: SimConfig) {
        self.context.config = config;
    }

    /// Registers the sink that receives this circuit's [Event]s.
    pub fn set_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.context.set_sink(Some(sink));
    }

    gate_constructors!(and, or, xor, nand, nor, xnor);

    /// Returns the [NodeId] of a new unconnected `not` gate `bits` wide.
    pub fn not<S: Into<String>>(&mut self, bits: u8, label: S) -> NodeId {
        self.add(Gate::new(Not, 1, bits), label)
    }

    /// Returns the [NodeId] of a new `not` gate fed by `a`.
    pub fn not1<A: Into<Endpoint>, S: Into<String>>(&mut self, a: A, label: S) -> Result<NodeId, SimError> {
        let a = self.source(a.into())?;
        let bits = self.port_bits(&a);
        let gate = self.not(bits, label);
        self.connect(a, gate)?;
        Ok(gate)
    }

    /// Returns the [NodeId] of a new [Input] `bits` wide, initially 0.
    pub fn input<S: Into<String>>(&mut self, label: S, bits: u8) -> NodeId {
        self.add(Input::new(bits), label)
    }

    /// Returns the [NodeId] of a new [Output] `bits` wide. Outputs are looked up by label with
    /// [Circuit::output_value] and become ports of [Template](super::Template)s.
    pub fn output<S: Into<String>>(&mut self, label: S, bits: u8) -> NodeId {
        self.add(Output::new(bits), label)
    }

    pub fn constant<S: Into<String>>(&mut self, label: S, bits: u8, value: Value) -> NodeId {
        self.add(Constant::new(bits, value), label)
    }

    /// Returns the [NodeId] of a new [Clock], `frequency` is in Hz.
    pub fn clock<S: Into<String>>(&mut self, label: S, frequency: f64) -> NodeId {
        self.add(Clock::new(frequency), label)
    }

    /// Adds a node of any kind and returns its [NodeId].
    ///
    /// # Example
    /// ```
    /// # use logicgraph::*;
    /// let mut c = Circuit::new();
    /// let adder = c.add(Adder::new(8), "adder");
    ///
    /// assert_eq!(c.node(adder).unwrap().kind().name(), "Adder");
    /// assert_eq!(c.find("adder"), Some(adder));
    /// ```
    pub fn add<K: Into<NodeKind>, S: Into<String>>(&mut self, kind: K, label: S) -> NodeId {
        self.insert_node(Node::new(kind.into(), label.into()))
    }

    /// Like [Circuit::add] but tags the node with a host side id, reported in [Event]s and faults.
    pub fn add_with_id<K: Into<NodeKind>, S: Into<String>, I: Into<String>>(
        &mut self,
        kind: K,
        label: S,
        external_id: I,
    ) -> NodeId {
        let mut node = Node::new(kind.into(), label.into());
        node.external_id = Some(external_id.into());
        self.insert_node(node)
    }

    pub(super) fn insert_node(&mut self, node: Node) -> NodeId {
        let role = node.role();
        let top_level = node.owner.is_none();
        let id = self.nodes.insert(node);
        match role {
            Role::Input | Role::Constant => self.inputs.push(id),
            Role::Clock => self.clocks.push(id),
            Role::Output if top_level => self.outputs.push(id),
            _ => {}
        }
        id
    }

    /// Binds the output port `src` to the input port `dest` with a new edge.
    ///
    /// Either side can be a [Connector] or a bare [NodeId], a bare node must have exactly one port in the
    /// relevant direction. Fails with [SimError::InvalidPortConnection] for unknown nodes or ports,
    /// ambiguous bare nodes and inputs that are already bound.
    pub fn connect<S: Into<Endpoint>, D: Into<Endpoint>>(
        &mut self,
        src: S,
        dest: D,
    ) -> Result<EdgeId, SimError> {
        self.connect_inner(src.into(), dest.into(), None)
    }

    /// Like [Circuit::connect] but tags the edge with a host side id, its changes are reported as
    /// [Event::WireChanged].
    pub fn connect_with_id<S: Into<Endpoint>, D: Into<Endpoint>, I: Into<String>>(
        &mut self,
        src: S,
        dest: D,
        external_id: I,
    ) -> Result<EdgeId, SimError> {
        self.connect_inner(src.into(), dest.into(), Some(external_id.into()))
    }

    fn connect_inner(
        &mut self,
        src: Endpoint,
        dest: Endpoint,
        external_id: Option<String>,
    ) -> Result<EdgeId, SimError> {
        let source = self.source(src)?;
        let target = self.target(dest)?;
        Ok(self.bind(source, target, external_id))
    }

    /// Creates the edge without validation, both connectors must name existing ports.
    pub(super) fn bind(
        &mut self,
        source: Connector,
        target: Connector,
        external_id: Option<String>,
    ) -> EdgeId {
        let id = self.edges.insert(Edge::new(
            source.node,
            source.port.clone(),
            target.node,
            target.port.clone(),
            external_id,
        ));
        if let Some(output) = self.nodes[source.node].outputs.get_mut(source.port.as_str()) {
            output.edges.push(id);
        }
        if let Some(input) = self.nodes[target.node].inputs.get_mut(target.port.as_str()) {
            input.edge = Some(id);
        }
        debug!(edge = %id, from = %source, to = %target, "connected");
        id
    }

    fn checked_node(&self, id: NodeId) -> Result<&Node, SimError> {
        self.nodes
            .get(id)
            .ok_or_else(|| SimError::InvalidPortConnection {
                endpoint: id.to_string(),
                reason: "no such node".to_string(),
            })
    }

    /// Resolves `endpoint` to an existing output port.
    fn source(&self, endpoint: Endpoint) -> Result<Connector, SimError> {
        match endpoint {
            Endpoint::Port(connector) => {
                let node = self.checked_node(connector.node)?;
                if node.outputs.contains_key(connector.port.as_str()) {
                    Ok(connector)
                } else {
                    Err(SimError::InvalidPortConnection {
                        reason: format!(
                            "{} has no output port `{}` (outputs: {})",
                            node.kind.name(),
                            connector.port,
                            port_list(node.outputs.keys())
                        ),
                        endpoint: connector.to_string(),
                    })
                }
            }
            Endpoint::Node(id) => {
                let node = self.checked_node(id)?;
                match node.outputs.len() {
                    1 => Ok(id.output(node.outputs.get_index(0).map_or("0", |(p, _)| p.as_str()))),
                    n => Err(SimError::InvalidPortConnection {
                        endpoint: id.to_string(),
                        reason: format!(
                            "{} has {} output ports, name one of: {}",
                            node.kind.name(),
                            n,
                            port_list(node.outputs.keys())
                        ),
                    }),
                }
            }
        }
    }

    /// Resolves `endpoint` to an existing, unbound input port.
    fn target(&self, endpoint: Endpoint) -> Result<Connector, SimError> {
        let connector = match endpoint {
            Endpoint::Port(connector) => connector,
            Endpoint::Node(id) => {
                let node = self.checked_node(id)?;
                match node.inputs.len() {
                    1 => id.input(node.inputs.get_index(0).map_or("0", |(p, _)| p.as_str())),
                    n => {
                        return Err(SimError::InvalidPortConnection {
                            endpoint: id.to_string(),
                            reason: format!(
                                "{} has {} input ports, name one of: {}",
                                node.kind.name(),
                                n,
                                port_list(node.inputs.keys())
                            ),
                        })
                    }
                }
            }
        };
        let node = self.checked_node(connector.node)?;
        match node.inputs.get(connector.port.as_str()) {
            Some(input) if input.edge.is_some() => Err(SimError::InvalidPortConnection {
                endpoint: connector.to_string(),
                reason: "input is already driven".to_string(),
            }),
            Some(_) => Ok(connector),
            None => Err(SimError::InvalidPortConnection {
                reason: format!(
                    "{} has no input port `{}` (inputs: {})",
                    node.kind.name(),
                    connector.port,
                    port_list(node.inputs.keys())
                ),
                endpoint: connector.to_string(),
            }),
        }
    }

    /// Width of an output port returned by [Circuit::source].
    fn port_bits(&self, source: &Connector) -> u8 {
        self.nodes[source.node]
            .outputs
            .get(source.port.as_str())
            .map_or(1, |output| output.bits)
    }

    /// Sets the value of `input`, truncated to its width. The change is picked up by the next pass, use
    /// [Circuit::settle_changes] to propagate only the inputs that changed.
    ///
    /// Returns true if the value changed.
    pub fn set_input(&mut self, input: NodeId, value: Value) -> Result<bool, SimError> {
        let node = self
            .nodes
            .get_mut(input)
            .ok_or_else(|| SimError::InvalidPortConnection {
                endpoint: input.to_string(),
                reason: "no such node".to_string(),
            })?;
        match &mut node.kind {
            NodeKind::Input(kind) => {
                let changed = kind.set(value);
                if changed {
                    self.dirty.insert(input);
                }
                Ok(changed)
            }
            _ => Err(self.scoped(SimError::NotAnInput {
                component: self.nodes[input].component(input),
            })),
        }
    }

    /// Like [Circuit::set_input] for the top level input labelled `label`.
    pub fn set_input_by_label(&mut self, label: &str, value: Value) -> Result<bool, SimError> {
        let input = self
            .inputs
            .iter()
            .copied()
            .find(|id| {
                let node = &self.nodes[*id];
                node.owner.is_none() && node.label == label
            })
            .ok_or_else(|| SimError::InvalidPortConnection {
                endpoint: label.to_string(),
                reason: "no input with this label".to_string(),
            })?;
        self.set_input(input, value)
    }

    fn set_clocks(&mut self, high: bool) {
        for &id in &self.clocks {
            if let NodeKind::Clock(clock) = &mut self.nodes[id].kind {
                clock.set_level(high);
            }
        }
    }

    fn seeds(&self, clocks: bool) -> Vec<NodeId> {
        let mut seeds = self.inputs.clone();
        if clocks {
            seeds.extend_from_slice(&self.clocks);
        }
        seeds
    }

    /// Runs a single combinational pass seeded with every input and constant.
    pub fn step(&mut self) -> Result<Pass, SimError> {
        self.dirty.clear();
        let seeds = self.seeds(false);
        self.pass(seeds)
    }

    /// Drives every clock high and runs a pass seeded with the inputs and the clocks.
    pub fn step_edge(&mut self) -> Result<Pass, SimError> {
        self.set_clocks(true);
        self.dirty.clear();
        let seeds = self.seeds(true);
        self.pass(seeds)
    }

    /// Propagates only the inputs changed by [Circuit::set_input] since the last pass, leaving the rest
    /// of the settled state alone.
    pub fn settle_changes(&mut self) -> Result<Pass, SimError> {
        let seeds: Vec<NodeId> = self.dirty.drain(..).collect();
        self.pass(seeds)
    }

    /// One clock cycle: settle, clocks high, settle, clocks low.
    ///
    /// Registers see a `D` computed purely by combinational logic before the rising edge, and their new `Q`
    /// ripples through before the falling edge. Returns false if any of the passes didn't converge.
    pub fn tick(&mut self) -> Result<bool, SimError> {
        let mut converged = self.step()?.converged;
        converged &= self.step_edge()?.converged;
        converged &= self.step()?.converged;
        self.set_clocks(false);
        let seeds = self.seeds(true);
        converged &= self.pass(seeds)?.converged;
        Ok(converged)
    }

    /// Calls [Circuit::tick] until the top level outputs stay the same for
    /// [stable_ticks](SimConfig::stable_ticks) consecutive ticks, at most [max_ticks](SimConfig::max_ticks)
    /// times.
    ///
    /// The stop flag is cleared on entry and checked before every tick.
    pub fn run(&mut self) -> Result<RunOutcome, SimError> {
        self.stop.reset();
        let stable_ticks = self.context.config.stable_ticks;
        let max_ticks = self.context.config.max_ticks;
        let mut previous = None;
        let mut unchanged = 0;
        for tick in 1..=max_ticks {
            if self.stop.is_stopped() {
                info!(ticks = tick - 1, "run stopped");
                return Ok(RunOutcome::Stopped { ticks: tick - 1 });
            }
            self.tick()?;
            let snapshot = self.output_values();
            if previous.as_ref() == Some(&snapshot) {
                unchanged += 1;
            } else {
                unchanged = 0;
            }
            previous = Some(snapshot);
            if unchanged >= stable_ticks {
                info!(ticks = tick, "circuit stabilized");
                return Ok(RunOutcome::Stable { ticks: tick });
            }
        }
        warn!(ticks = max_ticks, "circuit didn't stabilize");
        Ok(RunOutcome::Unstable { ticks: max_ticks })
    }

    /// Asks a running [Circuit::run] or [FreeRunner](crate::FreeRunner) to return before its next tick.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.handle()
    }

    /// Drains the work queue to a fixpoint or the iteration cap.
    fn pass(&mut self, seeds: Vec<NodeId>) -> Result<Pass, SimError> {
        self.queue.clear();
        self.changed_outputs.clear();
        self.changed_wires.clear();
        self.queue.extend(seeds);
        let max_iterations = self.context.config.max_iterations;
        let mut iterations = 0;
        while self.queue.pending_len() > 0 {
            if iterations >= max_iterations {
                self.queue.clear();
                self.report_changes();
                return self.timed_out(iterations);
            }
            iterations += 1;
            for edge in self.edges.values_mut() {
                edge.snapshot();
            }
            self.queue.swap();
            while let Some(id) = self.queue.pop() {
                self.evaluate(id)?;
            }
        }
        self.report_changes();
        debug!(iterations, "pass settled");
        Ok(Pass {
            iterations,
            converged: true,
        })
    }

    fn evaluate(&mut self, id: NodeId) -> Result<(), SimError> {
        let node = &mut self.nodes[id];
        let mut ctx = Propagation::new(&node.inputs, &node.outputs, &mut self.edges);
        let result = node.kind.behavior_mut().propagate(&mut ctx);
        let effects = ctx.finish();
        if let Err(fault) = result {
            return Err(self.fault(id, fault));
        }
        debug!(node = %id, kind = self.nodes[id].kind.name(), "evaluated");
        self.apply(id, effects);
        Ok(())
    }

    fn apply(&mut self, id: NodeId, effects: Effects) {
        self.queue.extend(effects.downstream);
        for output in self.nodes[id].outputs.values() {
            for &edge in &output.edges {
                if self.edges[edge].changed() {
                    self.queue.push(self.edges[edge].dest());
                }
            }
        }

        if let Some((target, value)) = effects.forwarded {
            if let Some(NodeKind::Input(input)) = self.nodes.get_mut(target).map(|n| &mut n.kind) {
                input.set(value);
            }
            self.queue.push(target);
        }

        if let Some(before) = effects.observed {
            if self.nodes[id].owner.is_none() {
                self.changed_outputs.entry(id).or_insert(before);
            }
        }

        for (edge, before) in effects.changed_edges {
            if self.edges[edge].external_id().is_some() {
                self.changed_wires.entry(edge).or_insert(before);
            }
        }
    }

    /// Reports the top level outputs and tagged edges whose value differs from the one they had when
    /// the pass started. Values seen in the middle of a pass are never reported.
    fn report_changes(&mut self) {
        for (id, before) in self.changed_outputs.drain(..) {
            let node = &self.nodes[id];
            let value = match &node.kind {
                NodeKind::Output(output) => output.recorded(),
                _ => None,
            };
            if let Some(value) = value.filter(|value| before != Some(*value)) {
                self.context.notify(|| Event::OutputChanged {
                    component: node.external_id.clone(),
                    label: node.label.clone(),
                    value,
                });
            }
        }

        for (id, before) in self.changed_wires.drain(..) {
            let edge = &self.edges[id];
            if let (Some(wire), Some(value)) = (edge.external_id(), edge.resolved()) {
                if before != Some(value) {
                    self.context.notify(|| Event::WireChanged {
                        wire: wire.to_owned(),
                        value,
                    });
                }
            }
        }
    }

    fn fault(&self, id: NodeId, fault: PortFault) -> SimError {
        let component = self.nodes[id].component(id);
        let err = self.scoped(match fault {
            PortFault::NotConnected { port } => SimError::InputNotConnected { component, port },
            PortFault::WidthMismatch {
                port,
                expected,
                actual,
            } => SimError::BitWidthMismatch {
                component,
                port,
                expected,
                actual,
            },
        });
        warn!(%err, "propagation failed");
        self.context.notify(|| Event::fault(&err, Severity::Error));
        err
    }

    /// Attaches this circuit's name to faults raised outside of any named template.
    fn scoped(&self, err: SimError) -> SimError {
        match self.name() {
            Some(name) => err.with_circuit(name),
            None => err,
        }
    }

    fn timed_out(&self, iterations: usize) -> Result<Pass, SimError> {
        let err = self.scoped(SimError::SimulationTimeout {
            circuit: None,
            iterations,
        });
        match self.context.config.timeout_policy {
            TimeoutPolicy::Warn => {
                warn!(%err, "keeping unsettled values");
                self.context.notify(|| Event::fault(&err, Severity::Warning));
                Ok(Pass {
                    iterations,
                    converged: false,
                })
            }
            TimeoutPolicy::Abort => {
                self.context.notify(|| Event::fault(&err, Severity::Error));
                Err(err)
            }
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the observable state of `node`: the value of inputs, constants, clocks and outputs, the `Q`
    /// of registers. [None] for stateless kinds.
    pub fn value(&self, node: NodeId) -> Option<Value> {
        self.nodes.get(node).and_then(Node::value)
    }

    /// Returns the value of the top level output labelled `label`.
    pub fn output_value(&self, label: &str) -> Option<Value> {
        self.outputs
            .iter()
            .find(|id| self.nodes[**id].label == label)
            .and_then(|id| self.value(*id))
    }

    /// Values of the top level outputs, in creation order.
    pub fn output_values(&self) -> Vec<Value> {
        self.outputs
            .iter()
            .map(|id| self.value(*id).unwrap_or(0))
            .collect()
    }

    /// Returns the first top level node labelled `label`. Nodes inside instances are looked up with
    /// [Instance::find](super::Instance::find).
    pub fn find(&self, label: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.owner.is_none() && node.label == label)
            .map(|(id, _)| id)
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    pub fn clocks(&self) -> &[NodeId] {
        &self.clocks
    }

    /// Period of the fastest clock, [None] without clocks of positive frequency.
    pub fn clock_period(&self) -> Option<Duration> {
        self.clocks
            .iter()
            .filter_map(|id| match &self.nodes[*id].kind {
                NodeKind::Clock(clock) if clock.frequency() > 0.0 => Some(clock.frequency()),
                _ => None,
            })
            .fold(None, |fastest: Option<f64>, f| {
                Some(fastest.map_or(f, |g| g.max(f)))
            })
            .map(|frequency| Duration::from_nanos((1e9 / frequency) as u64))
    }

    /// Renders the circuit in graphviz dot format.
    pub fn to_dot(&self) -> String {
        use petgraph::dot::Dot;
        let mut graph = petgraph::Graph::<String, String>::new();
        let index: Vec<_> = self
            .nodes
            .iter()
            .map(|(id, node)| graph.add_node(format!("{} {} {}", id, node.kind.name(), node.label)))
            .collect();
        for (_, edge) in self.edges.iter() {
            graph.add_edge(
                index[edge.source().slot()],
                index[edge.dest().slot()],
                format!("{}:{}", edge.source_port(), edge.dest_port()),
            );
        }
        format!("{}", Dot::with_config(&graph, &[]))
    }

    /// Writes [Circuit::to_dot] to `path`.
    pub fn dump_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_dot())
    }
}

fn port_list<'a, I: Iterator<Item = &'a PortName>>(ports: I) -> String {
    let names: Vec<_> = ports.map(PortName::as_str).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::width_mask;
    use crate::events::{EventKind, RecordingSink};

    fn half_adder() -> Circuit {
        let mut c = Circuit::named("half_adder");
        let a = c.input("a", 1);
        let b = c.input("b", 1);
        let sum = c.xor2(a, b, "xor").unwrap();
        let carry = c.and2(a, b, "and").unwrap();
        let sum_out = c.add_with_id(Output::new(1), "sum", "led-sum");
        let carry_out = c.output("carry", 1);
        c.connect(sum, sum_out).unwrap();
        c.connect_with_id(carry, carry_out, "wire-carry").unwrap();
        c
    }

    fn adder(bits: u8, a: Value, b: Value) -> Circuit {
        let mut c = Circuit::new();
        let ia = c.input("a", bits);
        let ib = c.input("b", bits);
        let add = c.add(Adder::new(bits), "add");
        let sum = c.output("sum", bits);
        let cout = c.output("cout", 1);
        c.connect(ia, add.input("a")).unwrap();
        c.connect(ib, add.input("b")).unwrap();
        c.connect(add.output("sum"), sum).unwrap();
        c.connect(add.output("cout"), cout).unwrap();
        c.set_input(ia, a).unwrap();
        c.set_input(ib, b).unwrap();
        c
    }

    /// Circuit with one `bits` wide input per value feeding `kind`, and one output per output port of
    /// `kind` labelled after the port.
    fn unit<K: Into<NodeKind>>(kind: K, values: &[(&str, Value)]) -> Circuit {
        let mut c = Circuit::new();
        let unit = c.add(kind, "unit");
        let node = c.node(unit).unwrap().clone();
        for (port, value) in values {
            let bits = node.inputs()[*port].bits().unwrap_or(8);
            let input = c.add(Input::with_value(bits, *value), *port);
            c.connect(input, unit.input(*port)).unwrap();
        }
        for (port, output) in node.outputs() {
            let out = c.output(port.as_str(), output.bits());
            c.connect(unit.output(port.as_str()), out).unwrap();
        }
        assert_settled!(c);
        c
    }

    #[test]
    fn test_half_adder() {
        let mut c = half_adder();
        let a = c.find("a").unwrap();
        c.set_input(a, 1).unwrap();
        assert_eq!(c.run().unwrap(), RunOutcome::Stable { ticks: 11 });
        assert_eq!(c.output_value("sum"), Some(1));
        assert_eq!(c.output_value("carry"), Some(0));

        c.set_input_by_label("b", 1).unwrap();
        assert!(c.run().unwrap().is_stable());
        assert_eq!(c.output_value("sum"), Some(0));
        assert_eq!(c.output_value("carry"), Some(1));
    }

    #[test]
    fn test_four_bit_adder() {
        let mut c = adder(4, 9, 6);
        assert!(c.run().unwrap().is_stable());
        assert_eq!(c.output_value("sum"), Some(15));
        assert_eq!(c.output_value("cout"), Some(0));

        let mut c = adder(4, 9, 9);
        assert_settled!(c);
        assert_eq!(c.output_value("sum"), Some(2));
        assert_eq!(c.output_value("cout"), Some(1));
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut c = adder(8, 0x5a, 0xc3);
            let outcome = c.run().unwrap();
            (outcome, c.output_values())
        };
        let first = run();
        assert_eq!(first.1, vec![0x1d, 1]);
        for _ in 0..5 {
            assert_eq!(run(), first);
        }
    }

    #[test]
    fn test_acyclic_settles_within_depth() {
        // input -> xor -> output is three levels deep.
        let mut c = half_adder();
        let pass = c.step().unwrap();
        assert!(pass.converged);
        assert_eq!(pass.iterations, 3);
    }

    #[test]
    fn test_width_masking() {
        let mut c = adder(4, 0x1f, 0xff);
        let a = c.find("a").unwrap();
        assert_eq!(c.value(a), Some(0xf));
        assert_settled!(c);
        assert_eq!(c.output_value("sum"), Some(14));
        assert_eq!(c.output_value("cout"), Some(1));

        for (_, edge) in c.edges() {
            let bits = edge.bits().unwrap();
            assert!(edge.value() <= width_mask(bits));
        }
    }

    #[test]
    fn test_fan_out() {
        let mut c = Circuit::new();
        let input = c.input("in", 8);
        let outs: Vec<_> = (0..3).map(|i| c.output(format!("out{}", i), 8)).collect();
        for out in &outs {
            c.connect(input, *out).unwrap();
        }
        c.set_input(input, 0xab).unwrap();
        assert_settled!(c);

        let port = &c.node(input).unwrap().outputs()["0"];
        assert_eq!(port.edges().len(), 3);
        for edge in port.edges() {
            assert_eq!(c.edge(*edge).unwrap().value(), 0xab);
        }
        assert_eq!(c.output_values(), vec![0xab; 3]);
    }

    #[test]
    fn test_width_mismatch() {
        let mut c = Circuit::named("top");
        let input = c.input("in", 4);
        let out = c.output("out", 8);
        c.connect(input, out).unwrap();

        match c.step().unwrap_err() {
            SimError::BitWidthMismatch {
                component,
                port,
                expected,
                actual,
            } => {
                assert_eq!(component.node, out);
                assert_eq!(component.kind, "Output");
                assert_eq!(component.label, "out");
                assert_eq!(component.circuit.as_deref(), Some("top"));
                assert_eq!(port.as_str(), "0");
                assert_eq!((expected, actual), (8, 4));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_input_not_connected() {
        let mut c = Circuit::new();
        let a = c.input("a", 1);
        let and = c.and(2, 1, "and");
        c.connect(a, and.input(0)).unwrap();

        let err = c.run().unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::InputNotConnected);
        assert_eq!(err.port().map(PortName::as_str), Some("1"));
        assert_eq!(err.component().unwrap().kind, "And");
        assert_eq!(err.circuit(), None);
    }

    #[test]
    fn test_invalid_connections() {
        let mut c = Circuit::new();
        let a = c.input("a", 4);
        let b = c.input("b", 4);
        let add = c.add(Adder::new(4), "add");
        let out = c.output("out", 4);

        // Two outputs, which one?
        let err = c.connect(add, out).unwrap_err();
        assert!(err.to_string().contains("sum, cout"), "{}", err);
        // Three inputs.
        assert!(c.connect(a, add).is_err());
        // Unknown ports.
        assert!(c.connect(a, add.input("c")).is_err());
        assert!(c.connect(add.output("carry"), out).is_err());
        // Inputs have no input ports.
        assert!(c.connect(a, b).is_err());

        c.connect(a, add.input("a")).unwrap();
        let err = c.connect(b, add.input("a")).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::InvalidPortConnection);
        assert!(err.to_string().contains("already driven"));

        // Handle from a bigger circuit.
        let mut other = Circuit::new();
        for i in 0..10 {
            other.input(format!("x{}", i), 1);
        }
        let far = other.output("far", 1);
        let err = c.connect(a, far).unwrap_err();
        assert!(err.to_string().contains("no such node"));
    }

    #[test]
    fn test_register_with_enable() {
        let mut c = Circuit::new();
        let d = c.input("D", 1);
        let en = c.input("en", 1);
        let clk = c.clock("clk", 1.0);
        let reg = c.add(Register::new(1), "reg");
        let q = c.output("Q", 1);
        c.connect(d, reg.input("D")).unwrap();
        c.connect(en, reg.input("en")).unwrap();
        c.connect(clk, reg.input("CLK")).unwrap();
        c.connect(reg, q).unwrap();

        c.set_input(d, 1).unwrap();
        c.set_input(en, 1).unwrap();
        assert!(c.tick().unwrap());
        assert_eq!(c.output_value("Q"), Some(1));
        assert_eq!(c.value(reg), Some(1));

        c.set_input(en, 0).unwrap();
        c.set_input(d, 0).unwrap();
        c.tick().unwrap();
        assert_eq!(c.output_value("Q"), Some(1));

        c.set_input(en, 1).unwrap();
        c.tick().unwrap();
        assert_eq!(c.output_value("Q"), Some(0));
    }

    #[test]
    fn test_register_latches_on_rising_edge_only() {
        let mut c = Circuit::new();
        let d = c.input("D", 4);
        let en = c.constant("en", 1, 1);
        let clk = c.input("clk", 1);
        let reg = c.add(Register::new(4), "reg");
        c.connect(d, reg.input("D")).unwrap();
        c.connect(en, reg.input("en")).unwrap();
        c.connect(clk, reg.input("CLK")).unwrap();
        assert_settled!(c);

        c.set_input(d, 3).unwrap();
        c.set_input(clk, 1).unwrap();
        c.settle_changes().unwrap();
        assert_eq!(c.value(reg), Some(3));

        // D changes while CLK stays high.
        c.set_input(d, 5).unwrap();
        c.settle_changes().unwrap();
        assert_eq!(c.value(reg), Some(3));

        c.set_input(clk, 0).unwrap();
        c.set_input(clk, 1).unwrap();
        c.settle_changes().unwrap();
        assert_eq!(c.value(reg), Some(3));

        c.set_input(clk, 0).unwrap();
        c.settle_changes().unwrap();
        c.set_input(clk, 1).unwrap();
        c.settle_changes().unwrap();
        assert_eq!(c.value(reg), Some(5));
    }

    #[test]
    fn test_priority_encoder() {
        let mut c = Circuit::new();
        let encoder = c.add(PriorityEncoder::new(4), "enc");
        let inputs: Vec<_> = (0..4)
            .map(|i| {
                let input = c.input(format!("i{}", i), 1);
                c.connect(input, encoder.input(i)).unwrap();
                input
            })
            .collect();
        let inum = c.output("inum", 2);
        let any = c.output("any", 1);
        c.connect(encoder.output("inum"), inum).unwrap();
        c.connect(encoder.output("any"), any).unwrap();

        assert_settled!(c);
        assert_eq!(c.output_value("inum"), Some(0));
        assert_eq!(c.output_value("any"), Some(0));

        c.set_input(inputs[0], 1).unwrap();
        c.settle_changes().unwrap();
        assert_eq!(c.output_value("inum"), Some(0));
        assert_eq!(c.output_value("any"), Some(1));

        c.set_input(inputs[2], 1).unwrap();
        c.settle_changes().unwrap();
        assert_eq!(c.output_value("inum"), Some(2));
    }

    #[test]
    fn test_sr_latch() {
        let mut c = Circuit::new();
        let s = c.input("s", 1);
        let r = c.input("r", 1);
        let q = c.nor(2, 1, "q");
        let qn = c.nor(2, 1, "qn");
        c.connect(r, q.input(0)).unwrap();
        c.connect(qn, q.input(1)).unwrap();
        c.connect(s, qn.input(0)).unwrap();
        c.connect(q, qn.input(1)).unwrap();
        let out = c.output("Q", 1);
        c.connect(q, out).unwrap();

        assert_settled!(c);

        c.set_input(r, 1).unwrap();
        assert!(c.run().unwrap().is_stable());
        assert_eq!(c.output_value("Q"), Some(0));

        c.set_input(r, 0).unwrap();
        assert!(c.run().unwrap().is_stable());
        assert_eq!(c.output_value("Q"), Some(0));

        c.set_input(s, 1).unwrap();
        assert!(c.run().unwrap().is_stable());
        assert_eq!(c.output_value("Q"), Some(1));

        c.set_input(s, 0).unwrap();
        assert!(c.run().unwrap().is_stable());
        assert_eq!(c.output_value("Q"), Some(1));
    }

    fn ring(policy: TimeoutPolicy) -> Circuit {
        let mut c = Circuit::with_config(SimConfig::default().with_timeout_policy(policy));
        let kick = c.input("kick", 1);
        let x = c.xor(2, 1, "x");
        let n1 = c.not1(x, "n1").unwrap();
        let n2 = c.not1(n1, "n2").unwrap();
        let n3 = c.not1(n2, "n3").unwrap();
        let out = c.output("out", 1);
        c.connect(kick, x.input(0)).unwrap();
        c.connect(n3, x.input(1)).unwrap();
        c.connect(n3, out).unwrap();
        c
    }

    /// Register feeding its own inverted output back, `out` toggles every tick.
    fn toggler() -> Circuit {
        let mut c = Circuit::new();
        let clk = c.clock("clk", 1.0);
        let en = c.constant("en", 1, 1);
        let reg = c.add(Register::new(1), "reg");
        let inv = c.not1(reg, "inv").unwrap();
        let out = c.output("out", 1);
        c.connect(inv, reg.input("D")).unwrap();
        c.connect(clk, reg.input("CLK")).unwrap();
        c.connect(en, reg.input("en")).unwrap();
        c.connect(reg, out).unwrap();
        c
    }

    #[test]
    fn test_ring_timeout_aborts() {
        let mut c = ring(TimeoutPolicy::Abort);
        let err = c.step().unwrap_err();
        assert_eq!(
            err,
            SimError::SimulationTimeout {
                circuit: None,
                iterations: 100
            }
        );
    }

    #[test]
    fn test_ring_timeout_warns() {
        let mut c = ring(TimeoutPolicy::Warn);
        let sink = Arc::new(RecordingSink::new());
        c.set_sink(sink.clone());

        let pass = c.step().unwrap();
        assert_eq!(
            pass,
            Pass {
                iterations: 100,
                converged: false
            }
        );
        let events = sink.take();
        let faults: Vec<_> = events
            .iter()
            .filter(|e| e.kind() == EventKind::Fault)
            .collect();
        assert_eq!(faults.len(), 1);
        match faults[0] {
            Event::Fault { severity, code, .. } => {
                assert_eq!(*severity, Severity::Warning);
                assert_eq!(*code, crate::ErrorCode::SimulationTimeout);
            }
            other => panic!("unexpected event {:?}", other),
        }
        // Only the value left when the pass gave up is reported, not every swing.
        let outputs = events
            .iter()
            .filter(|e| e.kind() == EventKind::OutputChanged)
            .count();
        assert_eq!(outputs, 1);

        // The abandoned oscillation is not resumed by later passes.
        assert!(c.step().unwrap().converged);
    }

    #[test]
    fn test_run_unstable() {
        let mut c = toggler();
        c.set_config(SimConfig::default().with_ticks(2, 8));
        assert_eq!(c.run().unwrap(), RunOutcome::Unstable { ticks: 8 });
        assert_eq!(c.output_value("out"), Some(0));
    }

    struct StopOnOutput(StopHandle);

    impl EventSink for StopOnOutput {
        fn notify(&self, event: &Event) {
            if event.kind() == EventKind::OutputChanged {
                self.0.stop();
            }
        }
    }

    #[test]
    fn test_run_stopped_between_ticks() {
        let mut c = toggler();
        c.set_sink(Arc::new(StopOnOutput(c.stop_handle())));
        assert_eq!(c.run().unwrap(), RunOutcome::Stopped { ticks: 1 });
        assert_eq!(c.output_value("out"), Some(1));
    }

    #[test]
    fn test_settle_changes_is_incremental() {
        let mut c = half_adder();
        assert_settled!(c);
        assert_eq!(
            c.settle_changes().unwrap(),
            Pass {
                iterations: 0,
                converged: true
            }
        );

        let b = c.find("b").unwrap();
        assert!(c.set_input(b, 1).unwrap());
        assert!(!c.set_input(b, 1).unwrap());
        assert!(c.settle_changes().unwrap().converged);
        assert_eq!(c.output_value("sum"), Some(1));
        assert_eq!(c.output_value("carry"), Some(0));

        let xor = c.find("xor").unwrap();
        assert!(c.set_input(xor, 1).is_err());
    }

    #[test]
    fn test_events() {
        let mut c = half_adder();
        let sink = Arc::new(RecordingSink::new());
        c.set_sink(sink.clone());
        c.set_input_by_label("a", 1).unwrap();
        c.set_input_by_label("b", 1).unwrap();
        assert_settled!(c);

        let events = sink.take();
        let outputs: Vec<_> = events
            .iter()
            .filter(|e| e.kind() == EventKind::OutputChanged)
            .collect();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].component(), Some("led-sum"));
        assert!(events.contains(&Event::WireChanged {
            wire: "wire-carry".into(),
            value: 1
        }));

        // Nothing changes, nothing is reported.
        assert_settled!(c);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_glitches_are_not_reported() {
        // `a & !a` is briefly 1 when `a` rises: the and gate is queued ahead of the inverter and sees the
        // new `a` with the old `!a`.
        let mut c = Circuit::new();
        let a = c.input("a", 1);
        let and = c.and(2, 1, "and");
        let na = c.not(1, "na");
        c.connect(a, and.input(0)).unwrap();
        c.connect(a, na).unwrap();
        c.connect(na, and.input(1)).unwrap();
        let out = c.output("out", 1);
        c.connect(and, out).unwrap();
        assert_settled!(c);

        let sink = Arc::new(RecordingSink::new());
        c.set_sink(sink.clone());
        c.set_input(a, 1).unwrap();
        assert_settled!(c);

        assert_eq!(c.output_value("out"), Some(0));
        assert!(sink
            .events()
            .iter()
            .all(|e| e.kind() != EventKind::OutputChanged));
    }

    #[test]
    fn test_output_reported_once_per_pass() {
        let mut c = Circuit::new();
        let a = c.input("a", 4);
        let b = c.input("b", 4);
        let sum = c.add(Adder::new(4), "adder");
        let out = c.output("out", 4);
        c.connect(a, sum.input("a")).unwrap();
        c.connect(b, sum.input("b")).unwrap();
        c.connect(sum.output("sum"), out).unwrap();
        assert_settled!(c);

        let sink = Arc::new(RecordingSink::new());
        c.set_sink(sink.clone());
        c.set_input(a, 3).unwrap();
        c.set_input(b, 4).unwrap();
        assert!(c.settle_changes().unwrap().converged);

        assert_eq!(
            sink.take(),
            vec![Event::OutputChanged {
                component: None,
                label: "out".into(),
                value: 7
            }]
        );
    }

    #[test]
    fn test_arithmetic_units() {
        let c = unit(Multiplier::new(4), &[("a", 9), ("b", 6)]);
        assert_eq!(c.output_value("mul"), Some(6));

        let c = unit(Divider::new(4), &[("a", 12), ("b", 8)]);
        assert_eq!(c.output_value("quot"), Some(1));
        assert_eq!(c.output_value("rem"), Some(4));

        let c = unit(Divider::new(4), &[("a", 12), ("b", 0)]);
        assert_eq!(c.output_value("quot"), Some(15));
        assert_eq!(c.output_value("rem"), Some(12));

        let c = unit(Subtractor::new(4), &[("a", 3), ("b", 5)]);
        assert_eq!(c.output_value("diff"), Some(14));
        assert_eq!(c.output_value("cout"), Some(1));

        let c = unit(BitCounter::new(8), &[("in", 155)]);
        assert_eq!(c.output_value("count"), Some(5));

        let c = unit(Comparator::new(4), &[("a", 3), ("b", 5)]);
        assert_eq!(c.output_values(), vec![0, 0, 1]);

        let c = unit(Negator::new(8), &[("in", 1)]);
        assert_eq!(c.output_value("out"), Some(0xff));

        let c = unit(SignExtender::new(4, 8), &[("in", 0b1010)]);
        assert_eq!(c.output_value("out"), Some(0xfa));
    }

    #[test]
    fn test_shifter_modes() {
        use ShiftDirection::*;
        use ShiftMode::*;
        let cases = [
            (Left, Logical, 0x81, 1, 0x02),
            (Right, Logical, 0x80, 2, 0x20),
            (Right, Arithmetic, 0x80, 2, 0xe0),
            (Right, Arithmetic, 0x40, 2, 0x10),
            (Left, Logical, 0xff, 8, 0x00),
        ];
        for (direction, mode, a, shift, expected) in cases.iter().copied() {
            let c = unit(Shifter::new(8, direction, mode), &[("a", a), ("shift", shift)]);
            assert_eq!(c.output_value("out"), Some(expected), "{:?} {:?}", direction, mode);
        }
    }

    #[test]
    fn test_plexers() {
        let c = unit(
            Multiplexer::new(1, 8),
            &[("0", 0x11), ("1", 0x22), ("sel", 1)],
        );
        assert_eq!(c.output_value("0"), Some(0x22));

        let c = unit(Decoder::new(2), &[("sel", 2)]);
        assert_eq!(c.output_values(), vec![0, 0, 1, 0]);
    }

    #[test]
    fn test_tunnel() {
        let c = unit(Tunnel::new(4), &[("0", 0x1b)]);
        assert_eq!(c.output_value("0"), Some(0xb));

        let mut c = Circuit::new();
        let input = c.input("in", 8);
        let tunnel = c.add(Tunnel::new(4), "bus");
        let out = c.output("out", 4);
        c.connect(input, tunnel).unwrap();
        c.connect(tunnel, out).unwrap();
        match c.step().unwrap_err() {
            SimError::BitWidthMismatch {
                component,
                expected,
                actual,
                ..
            } => {
                assert_eq!(component.kind, "Tunnel");
                assert_eq!(component.label, "bus");
                assert_eq!((expected, actual), (4, 8));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_oversized_split_range() {
        let mut c = Circuit::new();
        let input = c.input("in", 8);
        let split = c.add(Splitter::with_ranges(8, vec![(0u8, 255u8), (4, 200)]), "split");
        let whole = c.output("whole", 8);
        let high = c.output("high", 4);
        c.connect(input, split).unwrap();
        c.connect(split.output(0), whole).unwrap();
        c.connect(split.output(1), high).unwrap();

        c.set_input(input, 0xa5).unwrap();
        assert_settled!(c);
        assert_eq!(c.output_value("whole"), Some(0xa5));
        assert_eq!(c.output_value("high"), Some(0xa));
    }

    #[test]
    fn test_splitter_merger_round_trip() {
        let ranges = vec![(1u8, 0u8), (7, 6), (5, 2)];
        let mut c = Circuit::new();
        let input = c.input("in", 8);
        let split = c.add(Splitter::with_ranges(8, ranges.clone()), "split");
        let merge = c.add(Merger::with_ranges(8, ranges), "merge");
        let out = c.output("out", 8);
        let middle = c.output("middle", 4);
        c.connect(input, split).unwrap();
        for i in 0..3 {
            c.connect(split.output(i), merge.input(i)).unwrap();
        }
        c.connect(split.output(2), middle).unwrap();
        c.connect(merge, out).unwrap();

        c.set_input(input, 0b1011_0110).unwrap();
        assert_settled!(c);
        assert_eq!(c.output_value("middle"), Some(0b1101));
        assert_eq!(c.output_value("out"), Some(0b1011_0110));
    }

    #[test]
    fn test_rom_read() {
        let rom = Rom::new(2, 32, &[0x1, 0x2b2_82b3, 0x3]);
        let c = unit(rom.clone(), &[("A", 1)]);
        assert_eq!(c.output_value("D"), Some(0x2b2_82b3));

        let c = unit(rom, &[("A", 3), ("sel", 1)]);
        assert_eq!(c.output_value("D"), Some(0));
    }

    #[test]
    fn test_ram_store_and_load() {
        let mut c = Circuit::new();
        let ram = c.add(Ram::new(2, 8), "ram");
        let address = c.input("A", 2);
        let din = c.input("Din", 8);
        let st = c.input("st", 1);
        let ld = c.input("ld", 1);
        let clk = c.clock("clk", 1.0);
        let out = c.output("D", 8);
        for (node, port) in [(address, "A"), (din, "Din"), (st, "st"), (ld, "ld"), (clk, "CLK")].iter() {
            c.connect(*node, ram.input(*port)).unwrap();
        }
        c.connect(ram, out).unwrap();

        c.set_input(din, 3).unwrap();
        c.set_input(st, 1).unwrap();
        c.set_input(ld, 1).unwrap();
        c.tick().unwrap();
        assert_eq!(c.output_value("D"), Some(3));

        // Loading another address, then back.
        c.set_input(st, 0).unwrap();
        c.set_input(address, 1).unwrap();
        c.tick().unwrap();
        assert_eq!(c.output_value("D"), Some(0));
        c.set_input(address, 0).unwrap();
        c.set_input(ld, 0).unwrap();
        c.tick().unwrap();
        assert_eq!(c.output_value("D"), Some(0));
        c.set_input(ld, 1).unwrap();
        c.tick().unwrap();
        assert_eq!(c.output_value("D"), Some(3));

        match c.node(ram).unwrap().kind() {
            NodeKind::Ram(ram) => assert_eq!(ram.cells().dump(4), vec![3, 0, 0, 0]),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_run_stops() {
        let mut c = half_adder();
        c.stop();
        // The flag is cleared when a run starts.
        assert!(c.run().unwrap().is_stable());
        assert!(!c.stop_handle().is_stopped());
    }

    #[test]
    fn test_dot() {
        let c = half_adder();
        let dot = c.to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("Xor xor"));
        assert!(dot.contains("0:1"));
    }
}
