use super::*;
use crate::bits::mask;
use smallvec::SmallVec;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Enum representing the different operations a logic gate can perform.
#[derive(Clone, Debug, Copy, Eq, PartialEq, Hash, Display, EnumString, IntoStaticStr)]
pub enum GateOp {
    #[strum(to_string = "And", serialize = "and")]
    And,
    #[strum(to_string = "Or", serialize = "or")]
    Or,
    #[strum(to_string = "Xor", serialize = "xor")]
    Xor,
    #[strum(to_string = "Nand", serialize = "nand")]
    Nand,
    #[strum(to_string = "Nor", serialize = "nor")]
    Nor,
    #[strum(to_string = "Xnor", serialize = "xnor")]
    Xnor,
    #[strum(to_string = "Not", serialize = "not")]
    Not,
}
use GateOp::*;

impl GateOp {
    /// Folds `b` into the accumulated word `acc`, bitwise.
    /// Keep in mind if the gate [is negated](GateOp::is_negated) the result should be negated.
    ///
    /// # Example
    /// ```
    /// # use logicgraph::GateOp;
    /// assert_eq!(GateOp::Or.accumulate(0b1100, 0b1010), 0b1110);
    /// assert_eq!(GateOp::Nand.accumulate(0b1100, 0b1010), 0b1000);
    /// assert_eq!(GateOp::Xnor.accumulate(0b1100, 0b1010), 0b0110);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `self` is Not because it only has one input.
    #[inline(always)]
    pub fn accumulate(&self, acc: Value, b: Value) -> Value {
        match self {
            Or | Nor => acc | b,
            And | Nand => acc & b,
            Xor | Xnor => acc ^ b,
            Not => unreachable!("Accumulate only works on gates with multiple inputs"),
        }
    }

    /// Returns true if the reduction result gets inverted.
    #[inline(always)]
    pub fn is_negated(&self) -> bool {
        matches!(self, Nand | Nor | Xnor | Not)
    }
}

/// A logic gate over `bits` wide words.
///
/// The inputs are reduced left to right, inputs listed in `inverted_inputs` get inverted before the
/// reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    op: GateOp,
    inputs: usize,
    bits: u8,
    inverted_inputs: SmallVec<[usize; 2]>,
}

impl Gate {
    /// Returns a new gate with `inputs` inputs, a [Not](GateOp::Not) gate always has one.
    pub fn new(op: GateOp, inputs: usize, bits: u8) -> Self {
        let inputs = if op == Not { 1 } else { inputs.max(1) };
        Self {
            op,
            inputs,
            bits,
            inverted_inputs: Default::default(),
        }
    }

    /// Returns the gate with input `index` inverted before the reduction.
    pub fn invert_input(mut self, index: usize) -> Self {
        if index < self.inputs && !self.inverted_inputs.contains(&index) {
            self.inverted_inputs.push(index);
        }
        self
    }

    pub fn op(&self) -> GateOp {
        self.op
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Computes the output for `values`, taken in input order.
    ///
    /// # Example
    /// ```
    /// # use logicgraph::{Gate, GateOp};
    /// let nor = Gate::new(GateOp::Nor, 2, 4);
    /// assert_eq!(nor.evaluate([0b0011, 0b0101]), 0b1000);
    ///
    /// let and_not_b = Gate::new(GateOp::And, 2, 1).invert_input(1);
    /// assert_eq!(and_not_b.evaluate([1, 0]), 1);
    /// assert_eq!(and_not_b.evaluate([1, 1]), 0);
    /// ```
    pub fn evaluate<I: IntoIterator<Item = Value>>(&self, values: I) -> Value {
        let mut values = values.into_iter().enumerate().map(|(i, value)| {
            if self.inverted_inputs.contains(&i) {
                !value
            } else {
                value
            }
        });
        let first = values.next().unwrap_or(0);
        let result = match self.op {
            Not => first,
            op => values.fold(first, |acc, value| op.accumulate(acc, value)),
        };
        if self.op.is_negated() {
            mask(!result, self.bits)
        } else {
            mask(result, self.bits)
        }
    }
}

impl Behavior for Gate {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .numbered_inputs(self.inputs, self.bits)
            .output("0", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let values = (0..self.inputs)
            .map(|i| ctx.read_at(i))
            .collect::<Result<SmallVec<[Value; 4]>, _>>()?;
        ctx.write("0", self.evaluate(values));
        Ok(())
    }
}
