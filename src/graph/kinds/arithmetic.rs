use super::*;
use crate::bits::{mask, sign_bit, width_mask};
use strum_macros::{Display, EnumString};

/// `sum = a + b + cin`, `cout` is the bit just above the sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adder {
    bits: u8,
}

impl Adder {
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Behavior for Adder {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("a", self.bits)
            .input("b", self.bits)
            .input("cin", 1)
            .output("sum", self.bits)
            .output("cout", 1)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let a = ctx.read("a")?;
        let b = ctx.read("b")?;
        let cin = ctx.read_or("cin", 0)?;
        let total = a as u128 + b as u128 + (cin != 0) as u128;
        ctx.write("sum", total as Value);
        ctx.write("cout", ((total >> self.bits) & 1) as Value);
        Ok(())
    }
}

/// `diff = a - b - cin` in two's complement, `cout` is the borrow out of the top bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtractor {
    bits: u8,
}

impl Subtractor {
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Behavior for Subtractor {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("a", self.bits)
            .input("b", self.bits)
            .input("cin", 1)
            .output("diff", self.bits)
            .output("cout", 1)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let a = ctx.read("a")?;
        let b = ctx.read("b")?;
        let cin = ctx.read_or("cin", 0)?;
        let total = a as i128 - b as i128 - (cin != 0) as i128;
        ctx.write("diff", total as Value);
        ctx.write("cout", ((total >> self.bits) & 1) as Value);
        Ok(())
    }
}

/// Truncated product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multiplier {
    bits: u8,
}

impl Multiplier {
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Behavior for Multiplier {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("a", self.bits)
            .input("b", self.bits)
            .output("mul", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let a = ctx.read("a")?;
        let b = ctx.read("b")?;
        ctx.write("mul", a.wrapping_mul(b));
        Ok(())
    }
}

/// Unsigned quotient and remainder. Dividing by zero gives an all ones quotient and `rem = a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divider {
    bits: u8,
}

impl Divider {
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Behavior for Divider {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("a", self.bits)
            .input("b", self.bits)
            .output("quot", self.bits)
            .output("rem", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let a = ctx.read("a")?;
        let b = ctx.read("b")?;
        let (quot, rem) = match (a.checked_div(b), a.checked_rem(b)) {
            (Some(quot), Some(rem)) => (quot, rem),
            _ => (width_mask(self.bits), a),
        };
        ctx.write("quot", quot);
        ctx.write("rem", rem);
        Ok(())
    }
}

/// Unsigned comparison, exactly one of `gt`, `eq` and `lt` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    bits: u8,
}

impl Comparator {
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Behavior for Comparator {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("a", self.bits)
            .input("b", self.bits)
            .output("gt", 1)
            .output("eq", 1)
            .output("lt", 1)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let a = ctx.read("a")?;
        let b = ctx.read("b")?;
        ctx.write("gt", (a > b) as Value);
        ctx.write("eq", (a == b) as Value);
        ctx.write("lt", (a < b) as Value);
        Ok(())
    }
}

/// Two's complement negation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negator {
    bits: u8,
}

impl Negator {
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Behavior for Negator {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("in", self.bits)
            .output("out", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let value = ctx.read("in")?;
        ctx.write("out", value.wrapping_neg());
        Ok(())
    }
}

/// Widens an `input_width` value to `output_width` bits by replicating its sign bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignExtender {
    input_width: u8,
    output_width: u8,
}

impl SignExtender {
    pub fn new(input_width: u8, output_width: u8) -> Self {
        Self {
            input_width,
            output_width: output_width.max(input_width),
        }
    }

    /// # Example
    /// ```
    /// # use logicgraph::SignExtender;
    /// let sext = SignExtender::new(4, 8);
    /// assert_eq!(sext.extend(0b1010), 0b1111_1010);
    /// assert_eq!(sext.extend(0b0101), 0b0000_0101);
    /// ```
    pub fn extend(&self, value: Value) -> Value {
        let value = mask(value, self.input_width);
        if sign_bit(value, self.input_width) {
            mask(value | !width_mask(self.input_width), self.output_width)
        } else {
            value
        }
    }
}

impl Behavior for SignExtender {
    fn bits(&self) -> u8 {
        self.output_width
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("in", self.input_width)
            .output("out", self.output_width)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let value = ctx.read("in")?;
        ctx.write("out", self.extend(value));
        Ok(())
    }
}

/// Population count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitCounter {
    bits: u8,
}

impl BitCounter {
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Behavior for BitCounter {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("in", self.bits)
            .output("count", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let value = ctx.read("in")?;
        ctx.write("count", mask(value, self.bits).count_ones() as Value);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, EnumString)]
pub enum ShiftDirection {
    #[strum(serialize = "left")]
    Left,
    #[strum(serialize = "right")]
    Right,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, EnumString)]
pub enum ShiftMode {
    #[strum(serialize = "logical")]
    Logical,
    /// Right shifts fill with the sign bit.
    #[strum(serialize = "arithmetic")]
    Arithmetic,
}

/// Barrel shifter, `out = a << shift` or `a >> shift`. The shift amount is not width checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shifter {
    bits: u8,
    direction: ShiftDirection,
    mode: ShiftMode,
}

impl Shifter {
    pub fn new(bits: u8, direction: ShiftDirection, mode: ShiftMode) -> Self {
        Self {
            bits,
            direction,
            mode,
        }
    }

    /// # Example
    /// ```
    /// # use logicgraph::{Shifter, ShiftDirection, ShiftMode};
    /// let sra = Shifter::new(8, ShiftDirection::Right, ShiftMode::Arithmetic);
    /// assert_eq!(sra.shift(0b1000_0000, 3), 0b1111_0000);
    ///
    /// let srl = Shifter::new(8, ShiftDirection::Right, ShiftMode::Logical);
    /// assert_eq!(srl.shift(0b1000_0000, 3), 0b0001_0000);
    /// ```
    pub fn shift(&self, a: Value, amount: Value) -> Value {
        let a = mask(a, self.bits);
        let full = width_mask(self.bits);
        let saturated = amount >= self.bits as Value;
        match (self.direction, self.mode) {
            (ShiftDirection::Left, _) => {
                if saturated {
                    0
                } else {
                    mask(a << amount, self.bits)
                }
            }
            (ShiftDirection::Right, ShiftMode::Logical) => {
                if saturated {
                    0
                } else {
                    a >> amount
                }
            }
            (ShiftDirection::Right, ShiftMode::Arithmetic) => {
                let negative = sign_bit(a, self.bits);
                match (saturated, negative) {
                    (true, true) => full,
                    (true, false) => 0,
                    (false, true) => (a >> amount) | (full & !(full >> amount)),
                    (false, false) => a >> amount,
                }
            }
        }
    }
}

impl Behavior for Shifter {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("a", self.bits)
            .unchecked_input("shift")
            .output("out", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let a = ctx.read("a")?;
        let amount = ctx.read("shift")?;
        ctx.write("out", self.shift(a, amount));
        Ok(())
    }
}
