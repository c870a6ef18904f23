use super::*;
use crate::bits::mask;

/// Externally driven value, the equivalent of a lever on a breadboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    bits: u8,
    value: Value,
}

impl Input {
    pub fn new(bits: u8) -> Self {
        Self { bits, value: 0 }
    }

    pub fn with_value(bits: u8, value: Value) -> Self {
        Self {
            bits,
            value: mask(value, bits),
        }
    }

    pub fn value(&self) -> Value {
        self.value
    }

    /// Sets the value, truncated to the input's width. Returns true if it changed.
    pub(crate) fn set(&mut self, value: Value) -> bool {
        let value = mask(value, self.bits);
        let changed = self.value != value;
        self.value = value;
        changed
    }
}

impl Behavior for Input {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new().output("0", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        ctx.write("0", self.value);
        Ok(())
    }

    fn role(&self) -> Role {
        Role::Input
    }

    fn value(&self) -> Option<Value> {
        Some(self.value)
    }
}

/// A fixed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    bits: u8,
    value: Value,
}

impl Constant {
    pub fn new(bits: u8, value: Value) -> Self {
        Self {
            bits,
            value: mask(value, bits),
        }
    }
}

impl Behavior for Constant {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new().output("0", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        ctx.write("0", self.value);
        Ok(())
    }

    fn role(&self) -> Role {
        Role::Constant
    }

    fn value(&self) -> Option<Value> {
        Some(self.value)
    }
}

/// One bit clock signal. Clocked ticks toggle its level, `frequency` (Hz) is only used by schedulers
/// that tick on a wall clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    frequency: f64,
    high: bool,
}

impl Clock {
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            high: false,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    pub(crate) fn set_level(&mut self, high: bool) {
        self.high = high;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Behavior for Clock {
    fn bits(&self) -> u8 {
        1
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new().output("0", 1)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        ctx.write("0", self.high as Value);
        Ok(())
    }

    fn role(&self) -> Role {
        Role::Clock
    }

    fn value(&self) -> Option<Value> {
        Some(self.high as Value)
    }
}

/// Records the value it is fed. [None] until first evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    bits: u8,
    value: Option<Value>,
}

impl Output {
    pub fn new(bits: u8) -> Self {
        Self { bits, value: None }
    }

    pub fn value(&self) -> Value {
        self.value.unwrap_or(0)
    }

    /// The last value fed, [None] until first evaluated.
    pub fn recorded(&self) -> Option<Value> {
        self.value
    }
}

impl Behavior for Output {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new().input("0", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let value = ctx.read("0")?;
        if self.value != Some(value) {
            let previous = self.value.replace(value);
            ctx.observe(previous);
        }
        Ok(())
    }

    fn role(&self) -> Role {
        Role::Output
    }

    fn value(&self) -> Option<Value> {
        Some(self.value())
    }
}
