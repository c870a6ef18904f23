use super::handles::*;
use super::kinds::{InputProxy, NodeKind, OutputProxy};
use super::node::Node;
use super::Circuit;
use crate::error::SimError;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// A reusable blueprint made from a [Circuit].
///
/// The circuit's top level [Input](super::Input) and [Output](super::Output) nodes become the template's
/// ports, named by their labels; everything else is internal. Every [Circuit::instantiate] deep copies the
/// blueprint, state included, so instances never share anything.
///
/// # Example
///
/// ```
/// # use logicgraph::*;
/// let mut inverter = Circuit::named("inverter");
/// let i = inverter.input("in", 1);
/// let n = inverter.not1(i, "not").unwrap();
/// let o = inverter.output("out", 1);
/// inverter.connect(n, o).unwrap();
/// let inverter = Template::new(inverter).unwrap();
///
/// let mut c = Circuit::new();
/// let first = c.instantiate(&inverter);
/// let second = c.instantiate(&inverter);
/// let input = c.input("in", 1);
/// let output = c.output("out", 1);
/// c.connect(input, first.input("in").unwrap()).unwrap();
/// c.connect(first.output("out").unwrap(), second.input("in").unwrap()).unwrap();
/// c.connect(second.output("out").unwrap(), output).unwrap();
///
/// c.set_input(input, 1).unwrap();
/// c.step().unwrap();
/// assert_eq!(c.output_value("out"), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    name: Option<Arc<str>>,
    circuit: Circuit,
    inputs: BTreeMap<String, NodeId>,
    outputs: BTreeMap<String, NodeId>,
}

impl Template {
    /// Fails with [SimError::DuplicatePortLabel] if two inputs or two outputs share a label.
    pub fn new(circuit: Circuit) -> Result<Self, SimError> {
        let mut inputs = BTreeMap::new();
        let mut outputs = BTreeMap::new();
        for (id, node) in circuit.nodes() {
            if node.owner().is_some() {
                continue;
            }
            let (ports, role) = match node.kind() {
                NodeKind::Input(_) => (&mut inputs, "input"),
                NodeKind::Output(_) => (&mut outputs, "output"),
                _ => continue,
            };
            if ports.insert(node.label().to_owned(), id).is_some() {
                return Err(SimError::DuplicatePortLabel {
                    role,
                    label: node.label().to_owned(),
                });
            }
        }
        Ok(Self {
            name: circuit.name().map(Arc::from),
            circuit,
            inputs,
            outputs,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Input port labels, sorted.
    pub fn input_labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.inputs.keys().map(String::as_str)
    }

    /// Output port labels, sorted.
    pub fn output_labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.outputs.keys().map(String::as_str)
    }
}

/// A copy of a [Template] living inside a [Circuit], reachable only through its proxies.
///
/// [Instance::input] and [Instance::output] return [Connector]s to the proxies, to be used with
/// [Circuit::connect] like any other port.
#[derive(Debug, Clone)]
pub struct Instance {
    id: InstanceId,
    name: Option<Arc<str>>,
    inputs: BTreeMap<String, NodeId>,
    outputs: BTreeMap<String, NodeId>,
    nodes: Vec<NodeId>,
}

impl Instance {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Name of the template this is an instance of.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn port(
        &self,
        ports: &BTreeMap<String, NodeId>,
        direction: &str,
        label: &str,
    ) -> Result<NodeId, SimError> {
        ports
            .get(label)
            .copied()
            .ok_or_else(|| SimError::InvalidPortConnection {
                endpoint: format!("{}.{}", self.name().unwrap_or("instance"), label),
                reason: format!(
                    "no {} port `{}` (ports: {})",
                    direction,
                    label,
                    ports.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            })
    }

    /// Returns the [Connector] to feed the input port `label` from the outside.
    pub fn input(&self, label: &str) -> Result<Connector, SimError> {
        Ok(self.port(&self.inputs, "input", label)?.input(0))
    }

    /// Returns the [Connector] to read the output port `label` from the outside.
    pub fn output(&self, label: &str) -> Result<Connector, SimError> {
        Ok(self.port(&self.outputs, "output", label)?.output(0))
    }

    /// Connectors of every input port, sorted by label.
    pub fn inputs(&self) -> Vec<Connector> {
        self.inputs.values().map(|proxy| proxy.input(0)).collect()
    }

    /// Connectors of every output port, sorted by label.
    pub fn outputs(&self) -> Vec<Connector> {
        self.outputs.values().map(|proxy| proxy.output(0)).collect()
    }

    /// The internal nodes, proxies excluded.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns the internal node that was labelled `label` in the template.
    pub fn find(&self, circuit: &Circuit, label: &str) -> Option<NodeId> {
        let label = format!("{}_{}", label, self.id);
        self.nodes
            .iter()
            .copied()
            .find(|id| circuit.node(*id).map_or(false, |node| node.label() == label))
    }
}

impl Circuit {
    /// Deep copies `template` into this circuit and returns the [Instance] wrapping the copy.
    ///
    /// Nodes are cloned with their state, edges are replayed between the clones, and every port gets
    /// a proxy node. Instances of instances are copied recursively, each nested instance getting a
    /// fresh id.
    pub fn instantiate(&mut self, template: &Template) -> Instance {
        let id = self.allocate_instance();
        let source = &template.circuit;

        let mut remap = HashMap::with_capacity(source.len());
        let mut owners = HashMap::new();
        let mut nodes = Vec::with_capacity(source.len());
        for (old, node) in source.nodes() {
            let owner = match node.owner() {
                None => id,
                Some(inner) => match owners.get(&inner) {
                    Some(owner) => *owner,
                    None => {
                        let owner = self.allocate_instance();
                        owners.insert(inner, owner);
                        owner
                    }
                },
            };
            let new = self.insert_node(node.clone_into(owner, id, template.name.clone()));
            remap.insert(old, new);
            nodes.push(new);
        }
        for new in &nodes {
            self.nodes[*new].kind.behavior_mut().remap(&remap);
        }
        for (_, edge) in source.edges() {
            if let (Some(src), Some(dest)) = (remap.get(&edge.source()), remap.get(&edge.dest())) {
                self.bind(
                    src.output(edge.source_port().clone()),
                    dest.input(edge.dest_port().clone()),
                    None,
                );
            }
        }

        let mut inputs = BTreeMap::new();
        for (label, old) in &template.inputs {
            if let Some(&wrapped) = remap.get(old) {
                let bits = self.nodes[wrapped].bits();
                let proxy = self.proxy(InputProxy::new(wrapped, bits).into(), label, id, template);
                inputs.insert(label.clone(), proxy);
            }
        }

        let mut outputs = BTreeMap::new();
        for (label, old) in &template.outputs {
            if let Some(&wrapped) = remap.get(old) {
                let bits = self.nodes[wrapped].bits();
                let proxy = self.proxy(OutputProxy::new(bits).into(), label, id, template);
                // Wired in parallel with the wrapped output.
                let feed = self.nodes[wrapped]
                    .inputs
                    .get("0")
                    .and_then(|port| port.edge)
                    .map(|edge| {
                        let edge = &self.edges[edge];
                        edge.source().output(edge.source_port().clone())
                    });
                if let Some(feed) = feed {
                    self.bind(feed, proxy.input(0), None);
                }
                outputs.insert(label.clone(), proxy);
            }
        }

        debug!(
            instance = %id,
            template = template.name().unwrap_or(""),
            nodes = nodes.len(),
            "instantiated"
        );
        Instance {
            id,
            name: template.name.clone(),
            inputs,
            outputs,
            nodes,
        }
    }

    fn allocate_instance(&mut self) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        id
    }

    fn proxy(&mut self, kind: NodeKind, label: &str, id: InstanceId, template: &Template) -> NodeId {
        let mut node = Node::new(kind, label.to_owned());
        node.owner = Some(id);
        node.scope = template.name.clone();
        self.insert_node(node)
    }
}
