use crate::data_structures::ArenaIndex;
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

/// Represents the index of a node in a [Circuit](super::Circuit).
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct NodeId {
    pub(super) idx: usize,
}

/// Represents the index of an edge in a [Circuit](super::Circuit).
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct EdgeId {
    pub(super) idx: usize,
}

/// Identifies one [Instance](super::Instance) inside the circuit that created it.
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct InstanceId(pub(super) usize);

impl ArenaIndex for NodeId {
    fn from_slot(i: usize) -> Self {
        NodeId { idx: i }
    }
    fn slot(self) -> usize {
        self.idx
    }
}

impl ArenaIndex for EdgeId {
    fn from_slot(i: usize) -> Self {
        EdgeId { idx: i }
    }
    fn slot(self) -> usize {
        self.idx
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.idx)
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.idx)
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl NodeId {
    /// Returns a [Connector] to the input port `port` of this node.
    ///
    /// Ports can be named by string or by position, `0` is the same port as `"0"`.
    pub fn input<P: Into<PortName>>(self, port: P) -> Connector {
        Connector {
            node: self,
            port: port.into(),
        }
    }

    /// Returns a [Connector] to the output port `port` of this node.
    pub fn output<P: Into<PortName>>(self, port: P) -> Connector {
        Connector {
            node: self,
            port: port.into(),
        }
    }
}

/// Name of a port on a node.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct PortName(String);

impl PortName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortName {
    fn from(s: &str) -> Self {
        PortName(s.to_owned())
    }
}

impl From<String> for PortName {
    fn from(s: String) -> Self {
        PortName(s)
    }
}

impl From<usize> for PortName {
    fn from(i: usize) -> Self {
        PortName(i.to_string())
    }
}

impl Borrow<str> for PortName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for PortName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A specific port on a specific node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Connector {
    pub node: NodeId,
    pub port: PortName,
}

impl Display for Connector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

/// One side of a [Circuit::connect](super::Circuit::connect) call.
///
/// A bare node is accepted when it has exactly one port of the relevant direction.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Endpoint {
    Node(NodeId),
    Port(Connector),
}

impl From<NodeId> for Endpoint {
    fn from(node: NodeId) -> Self {
        Endpoint::Node(node)
    }
}

impl From<Connector> for Endpoint {
    fn from(connector: Connector) -> Self {
        Endpoint::Port(connector)
    }
}

impl From<&Connector> for Endpoint {
    fn from(connector: &Connector) -> Self {
        Endpoint::Port(connector.clone())
    }
}
