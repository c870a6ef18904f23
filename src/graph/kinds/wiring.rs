use super::*;
use crate::bits::{bit_ranges, BitRange};

/// Splits a `bits` wide value into one output per range, output `i` carries range `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splitter {
    bits: u8,
    ranges: Vec<BitRange>,
}

impl Splitter {
    /// Splitter with one single-bit output per bit.
    pub fn new(bits: u8) -> Self {
        Self::with_ranges(bits, bit_ranges(bits))
    }

    /// Splitter with one output per range, in the given order. Ranges are clamped to `bits`.
    pub fn with_ranges<R: Into<BitRange>, I: IntoIterator<Item = R>>(bits: u8, ranges: I) -> Self {
        Self {
            bits,
            ranges: ranges
                .into_iter()
                .map(|range| BitRange::clamp(range.into(), bits))
                .collect(),
        }
    }

    pub fn ranges(&self) -> &[BitRange] {
        &self.ranges
    }
}

impl Behavior for Splitter {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        self.ranges
            .iter()
            .enumerate()
            .fold(PortLayout::new().input("0", self.bits), |layout, (i, range)| {
                layout.output(i, range.width())
            })
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let value = ctx.read("0")?;
        for (i, range) in self.ranges.iter().enumerate() {
            ctx.write_at(i, range.extract(value));
        }
        Ok(())
    }
}

/// Packs one input per range into a single `bits` wide value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merger {
    bits: u8,
    ranges: Vec<BitRange>,
}

impl Merger {
    /// Merger with one single-bit input per bit.
    pub fn new(bits: u8) -> Self {
        Self::with_ranges(bits, bit_ranges(bits))
    }

    /// Merger with one input per range, ranges are clamped to `bits`.
    pub fn with_ranges<R: Into<BitRange>, I: IntoIterator<Item = R>>(bits: u8, ranges: I) -> Self {
        Self {
            bits,
            ranges: ranges
                .into_iter()
                .map(|range| BitRange::clamp(range.into(), bits))
                .collect(),
        }
    }

    pub fn ranges(&self) -> &[BitRange] {
        &self.ranges
    }
}

impl Behavior for Merger {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        self.ranges
            .iter()
            .enumerate()
            .fold(PortLayout::new(), |layout, (i, range)| {
                layout.input(i, range.width())
            })
            .output("0", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let mut value = 0;
        for (i, range) in self.ranges.iter().enumerate() {
            value |= range.place(ctx.read_at(i)?);
        }
        ctx.write("0", value);
        Ok(())
    }
}

/// Pass-through that lets a signal be routed by label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tunnel {
    bits: u8,
}

impl Tunnel {
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Behavior for Tunnel {
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
