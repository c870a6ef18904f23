use super::handles::*;
use crate::bits::Value;

/// A directed, valued binding from one output port to one input port.
///
/// An edge's width is unresolved until its first [write](Edge::write); unresolved edges read as 0.
/// `previous` is the value seen at the start of the current iteration, the [Circuit](super::Circuit)
/// snapshots it before every drain of the work queue.
#[derive(Debug, Clone)]
pub struct Edge {
    source: NodeId,
    source_port: PortName,
    dest: NodeId,
    dest_port: PortName,
    value: Value,
    bits: u8,
    previous: Option<Value>,
    external_id: Option<String>,
}

impl Edge {
    pub(super) fn new(
        source: NodeId,
        source_port: PortName,
        dest: NodeId,
        dest_port: PortName,
        external_id: Option<String>,
    ) -> Self {
        Self {
            source,
            source_port,
            dest,
            dest_port,
            value: 0,
            bits: 0,
            previous: None,
            external_id,
        }
    }

    /// Stores `value`, already masked by the writing node, and returns the destination node.
    pub fn write(&mut self, value: Value, bits: u8) -> NodeId {
        self.value = value;
        self.bits = bits;
        self.dest
    }

    /// Current value, 0 while unresolved.
    pub fn value(&self) -> Value {
        self.value
    }

    /// Width of the last write, [None] while unresolved.
    pub fn bits(&self) -> Option<u8> {
        if self.bits == 0 {
            None
        } else {
            Some(self.bits)
        }
    }

    /// Returns the value if the edge has been written at least once.
    pub fn resolved(&self) -> Option<Value> {
        self.bits().map(|_| self.value)
    }

    pub(super) fn snapshot(&mut self) {
        self.previous = self.resolved();
    }

    /// Returns true if the edge changed since the last snapshot. A first write always counts.
    pub fn changed(&self) -> bool {
        self.previous != self.resolved()
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn source_port(&self) -> &PortName {
        &self.source_port
    }

    pub fn dest(&self) -> NodeId {
        self.dest
    }

    pub fn dest_port(&self) -> &PortName {
        &self.dest_port
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::ArenaIndex;

    fn edge() -> Edge {
        Edge::new(
            NodeId::from_slot(0),
            "0".into(),
            NodeId::from_slot(1),
            "a".into(),
            None,
        )
    }

    #[test]
    fn test_write_returns_destination() {
        let mut e = edge();
        assert_eq!(e.bits(), None);
        assert_eq!(e.value(), 0);

        assert_eq!(e.write(5, 4), NodeId::from_slot(1));
        assert_eq!(e.value(), 5);
        assert_eq!(e.bits(), Some(4));
        assert_eq!(e.dest_port().as_str(), "a");
    }

    #[test]
    fn test_change_detection() {
        let mut e = edge();
        e.snapshot();
        assert!(!e.changed());

        // First write counts as a change even when the value stays 0.
        e.write(0, 1);
        assert!(e.changed());

        e.snapshot();
        e.write(0, 1);
        assert!(!e.changed());

        e.write(1, 1);
        assert!(e.changed());
    }
}
