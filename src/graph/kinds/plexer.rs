use super::*;
use crate::bits::index_bits;

/// Routes data input `sel` to its output. Data inputs are "0" to "2^selector_bits - 1".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multiplexer {
    selector_bits: u8,
    bits: u8,
}

impl Multiplexer {
    pub fn new(selector_bits: u8, bits: u8) -> Self {
        Self {
            selector_bits,
            bits,
        }
    }

    pub fn data_inputs(&self) -> usize {
        1 << self.selector_bits
    }
}

impl Behavior for Multiplexer {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .numbered_inputs(self.data_inputs(), self.bits)
            .input("sel", self.selector_bits)
            .output("0", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let sel = ctx.read("sel")? as usize % self.data_inputs();
        let value = ctx.read_at(sel)?;
        ctx.write("0", value);
        Ok(())
    }
}

/// One-hot decoder, output `sel` is 1, every other output is 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoder {
    selector_bits: u8,
}

impl Decoder {
    pub fn new(selector_bits: u8) -> Self {
        Self { selector_bits }
    }

    pub fn outputs(&self) -> usize {
        1 << self.selector_bits
    }
}

impl Behavior for Decoder {
    fn bits(&self) -> u8 {
        self.selector_bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("sel", self.selector_bits)
            .numbered_outputs(self.outputs(), 1)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let sel = ctx.read("sel")? as usize;
        for i in 0..self.outputs() {
            ctx.write_at(i, (i == sel) as Value);
        }
        Ok(())
    }
}

/// Reports the highest numbered asserted input on `inum` and whether any input is asserted on `any`,
/// so "input 0 won" and "nothing asserted" can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityEncoder {
    inputs: usize,
}

impl PriorityEncoder {
    pub fn new(inputs: usize) -> Self {
        Self {
            inputs: inputs.max(1),
        }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }
}

impl Behavior for PriorityEncoder {
    fn bits(&self) -> u8 {
        index_bits(self.inputs)
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .numbered_inputs(self.inputs, 1)
            .output("inum", index_bits(self.inputs))
            .output("any", 1)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let mut winner = None;
        for i in (0..self.inputs).rev() {
            if ctx.read_at(i)? & 1 == 1 {
                winner = Some(i);
                break;
            }
        }
        ctx.write("inum", winner.unwrap_or(0) as Value);
        ctx.write("any", winner.is_some() as Value);
        Ok(())
    }
}
