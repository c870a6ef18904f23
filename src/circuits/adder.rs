use crate::graph::*;
use crate::SimError;

fn mkname(name: String) -> String {
    format!("ADDER:{}", name)
}

/// Returns the sum and carry nodes of a half adder fed by `a` and `b`.
pub fn half_adder<A: Into<Endpoint>, B: Into<Endpoint>, S: Into<String>>(
    c: &mut Circuit,
    a: A,
    b: B,
    name: S,
) -> Result<(NodeId, NodeId), SimError> {
    let name = mkname(name.into());
    let a = a.into();
    let b = b.into();

    let sum = c.xor2(a.clone(), b.clone(), name.clone())?;
    let carry = c.and2(a, b, name)?;
    Ok((sum, carry))
}

/// Returns a one bit full adder [Template] named `add_1bit`.
///
/// Inputs `a`, `b` and `cin`, outputs `sum` and `cout`.
pub fn full_adder() -> Result<Template, SimError> {
    let mut c = Circuit::named("add_1bit");
    let a = c.input("a", 1);
    let b = c.input("b", 1);
    let cin = c.input("cin", 1);

    let (partial, carry1) = half_adder(&mut c, a, b, "ha1")?;
    let (sum, carry2) = half_adder(&mut c, partial, cin, "ha2")?;
    let carry = c.or2(carry1, carry2, mkname("carry".into()))?;

    let sum_out = c.output("sum", 1);
    let cout = c.output("cout", 1);
    c.connect(sum, sum_out)?;
    c.connect(carry, cout)?;

    Template::new(c)
}

/// Returns a `width` bit ripple carry adder [Template] named `add_{width}bit`, built from one instance of
/// `full_adder` per bit.
///
/// Inputs `a`, `b` (`width` bits) and `cin`, outputs `sum` (`width` bits) and `cout`.
///
/// # Example
///
/// ```
/// # use logicgraph::*;
/// let adder = ripple_carry_adder(&full_adder().unwrap(), 8).unwrap();
///
/// let mut c = Circuit::new();
/// let add = c.instantiate(&adder);
/// let a = c.input("a", 8);
/// let b = c.input("b", 8);
/// let sum = c.output("sum", 8);
/// c.connect(a, add.input("a").unwrap()).unwrap();
/// c.connect(b, add.input("b").unwrap()).unwrap();
/// c.connect(add.output("sum").unwrap(), sum).unwrap();
///
/// c.set_input(a, 0x12).unwrap();
/// c.set_input(b, 0x34).unwrap();
/// assert!(c.run().unwrap().is_stable());
/// assert_eq!(c.output_value("sum"), Some(0x46));
/// ```
pub fn ripple_carry_adder(full_adder: &Template, width: u8) -> Result<Template, SimError> {
    let mut c = Circuit::named(format!("add_{}bit", width));
    let a = c.input("a", width);
    let b = c.input("b", width);
    let cin = c.input("cin", 1);
    let sum = c.output("sum", width);
    let cout = c.output("cout", 1);

    let split_a = c.add(Splitter::new(width), mkname("a".into()));
    let split_b = c.add(Splitter::new(width), mkname("b".into()));
    let merge = c.add(Merger::new(width), mkname("sum".into()));
    c.connect(a, split_a)?;
    c.connect(b, split_b)?;

    let mut carry = cin.output(0);
    for i in 0..width as usize {
        let bit = c.instantiate(full_adder);
        c.connect(split_a.output(i), bit.input("a")?)?;
        c.connect(split_b.output(i), bit.input("b")?)?;
        c.connect(&carry, bit.input("cin")?)?;
        c.connect(bit.output("sum")?, merge.input(i))?;
        carry = bit.output("cout")?;
    }
    c.connect(merge, sum)?;
    c.connect(carry, cout)?;

    Template::new(c)
}
