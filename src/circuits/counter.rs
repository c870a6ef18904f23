use crate::graph::*;
use crate::SimError;

fn mkname(name: String) -> String {
    format!("CNTR:{}", name)
}

/// Returns the register of a `bits` wide counter that increments on every rising edge of `clock` while
/// `enable` is set, wrapping around to 0.
///
/// # Example
///
/// ```
/// # use logicgraph::*;
/// let mut c = Circuit::new();
/// let clock = c.clock("clk", 1.0);
/// let enable = c.constant("enable", 1, 1);
/// let count = counter(&mut c, clock, enable, 4, "counter").unwrap();
/// let out = c.output("count", 4);
/// c.connect(count, out).unwrap();
///
/// for _ in 0..3 {
///     c.tick().unwrap();
/// }
/// assert_eq!(c.output_value("count"), Some(3));
/// ```
pub fn counter<C: Into<Endpoint>, E: Into<Endpoint>, S: Into<String>>(
    c: &mut Circuit,
    clock: C,
    enable: E,
    bits: u8,
    name: S,
) -> Result<NodeId, SimError> {
    let name = mkname(name.into());

    let register = c.add(Register::new(bits), name.clone());
    let one = c.constant(name.clone(), bits, 1);
    let increment = c.add(Adder::new(bits), name);
    c.connect(register, increment.input("a"))?;
    c.connect(one, increment.input("b"))?;
    c.connect(increment.output("sum"), register.input("D"))?;
    c.connect(clock, register.input("CLK"))?;
    c.connect(enable, register.input("en"))?;

    Ok(register)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_wraps() {
        let mut c = Circuit::new();
        let clock = c.clock("clk", 1.0);
        let enable = c.input("enable", 1);
        let count = counter(&mut c, clock, enable, 3, "cnt").unwrap();
        let out = c.output("count", 3);
        c.connect(count, out).unwrap();

        c.tick().unwrap();
        assert_eq!(c.output_value("count"), Some(0));

        c.set_input(enable, 1).unwrap();
        for i in 1..=10 {
            assert!(c.tick().unwrap());
            assert_eq!(c.output_value("count"), Some(i % 8));
        }

        c.set_input(enable, 0).unwrap();
        c.tick().unwrap();
        assert_eq!(c.output_value("count"), Some(2));
    }
}
