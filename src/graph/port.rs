use super::handles::*;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// An input port binds at most one edge. `bits` is the width the node expects,
/// [None] for ports that accept any width.
#[derive(Debug, Clone)]
pub struct InputPort {
    pub(super) edge: Option<EdgeId>,
    pub(super) bits: Option<u8>,
}

impl InputPort {
    pub fn edge(&self) -> Option<EdgeId> {
        self.edge
    }

    pub fn bits(&self) -> Option<u8> {
        self.bits
    }
}

/// An output port fans out to any number of edges, every write is masked to `bits`.
#[derive(Debug, Clone)]
pub struct OutputPort {
    pub(super) edges: SmallVec<[EdgeId; 2]>,
    pub(super) bits: u8,
}

impl OutputPort {
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }
}

pub type InputPorts = IndexMap<PortName, InputPort>;
pub type OutputPorts = IndexMap<PortName, OutputPort>;

/// The ports a node kind declares, in order. Numbered ports come first by convention.
///
/// # Example
///
/// ```
/// # use logicgraph::PortLayout;
/// let layout = PortLayout::new()
///     .numbered_inputs(2, 8)
///     .input("sel", 1)
///     .output("0", 8);
///
/// assert_eq!(layout.input_names(), vec!["0", "1", "sel"]);
/// assert_eq!(layout.output_names(), vec!["0"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PortLayout {
    pub(super) inputs: Vec<(PortName, Option<u8>)>,
    pub(super) outputs: Vec<(PortName, u8)>,
}

impl PortLayout {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an input that expects `bits` wide values.
    pub fn input<P: Into<PortName>>(mut self, name: P, bits: u8) -> Self {
        self.inputs.push((name.into(), Some(bits)));
        self
    }

    /// Adds an input that accepts any width.
    pub fn unchecked_input<P: Into<PortName>>(mut self, name: P) -> Self {
        self.inputs.push((name.into(), None));
        self
    }

    /// Adds inputs "0" to "n-1".
    pub fn numbered_inputs(mut self, n: usize, bits: u8) -> Self {
        self.inputs
            .extend((0..n).map(|i| (PortName::from(i), Some(bits))));
        self
    }

    pub fn output<P: Into<PortName>>(mut self, name: P, bits: u8) -> Self {
        self.outputs.push((name.into(), bits));
        self
    }

    /// Adds outputs "0" to "n-1".
    pub fn numbered_outputs(mut self, n: usize, bits: u8) -> Self {
        self.outputs.extend((0..n).map(|i| (PortName::from(i), bits)));
        self
    }

    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub(super) fn into_ports(self) -> (InputPorts, OutputPorts) {
        let inputs = self
            .inputs
            .into_iter()
            .map(|(name, bits)| (name, InputPort { edge: None, bits }))
            .collect();
        let outputs = self
            .outputs
            .into_iter()
            .map(|(name, bits)| {
                (
                    name,
                    OutputPort {
                        edges: Default::default(),
                        bits,
                    },
                )
            })
            .collect();
        (inputs, outputs)
    }
}
