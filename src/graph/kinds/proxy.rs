use super::*;

/// Boundary of a component instance: forwards the value it is fed into the wrapped [Input] node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputProxy {
    wrapped: NodeId,
    bits: u8,
}

impl InputProxy {
    pub(crate) fn new(wrapped: NodeId, bits: u8) -> Self {
        Self { wrapped, bits }
    }

    pub fn wrapped(&self) -> NodeId {
        self.wrapped
    }
}

impl Behavior for InputProxy {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new().input("0", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let value = ctx.read("0")?;
        ctx.forward(self.wrapped, value);
        Ok(())
    }

    fn remap(&mut self, nodes: &HashMap<NodeId, NodeId>) {
        if let Some(wrapped) = nodes.get(&self.wrapped) {
            self.wrapped = *wrapped;
        }
    }
}

/// Boundary of a component instance: wired in parallel with a wrapped [Output] node, forwards its value
/// to the outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputProxy {
    bits: u8,
}

impl OutputProxy {
    pub(crate) fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Behavior for OutputProxy {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("0", self.bits)
            .output("0", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let value = ctx.read("0")?;
        ctx.write("0", value);
        Ok(())
    }
}
