use crate::graph::*;
use crate::SimError;

fn mkname(name: String) -> String {
    format!("SRLATCH:{}", name)
}

/// Returns the Q node of an [SR latch](https://en.wikipedia.org/wiki/Flip-flop_(electronics)#SR_NOR_latch)
/// made of two cross coupled NOR gates.
///
/// # Example
///
/// ```
/// # use logicgraph::*;
/// let mut c = Circuit::new();
/// let s = c.input("s", 1);
/// let r = c.input("r", 1);
///
/// let q = sr_latch(&mut c, s, r, "latch").unwrap();
/// let q_output = c.output("q", 1);
/// c.connect(q, q_output).unwrap();
///
/// // With latches, the initial state should be treated as undefined,
/// // so remember to always reset your latches at the beginning of the simulation.
/// c.set_input(r, 1).unwrap();
/// c.step().unwrap();
/// c.set_input(r, 0).unwrap();
/// c.step().unwrap();
/// assert_eq!(c.output_value("q"), Some(0));
///
/// c.set_input(s, 1).unwrap();
/// c.step().unwrap();
/// c.set_input(s, 0).unwrap();
/// c.step().unwrap();
/// assert_eq!(c.output_value("q"), Some(1));
/// ```
pub fn sr_latch<S: Into<Endpoint>, R: Into<Endpoint>, N: Into<String>>(
    c: &mut Circuit,
    s: S,
    r: R,
    name: N,
) -> Result<NodeId, SimError> {
    let name = mkname(name.into());

    let q = c.nor(2, 1, name.clone());
    let nq = c.nor(2, 1, name);
    c.connect(r, q.input(0))?;
    c.connect(nq, q.input(1))?;
    c.connect(s, nq.input(0))?;
    c.connect(q, nq.input(1))?;

    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(c: &mut Circuit, input: NodeId) {
        c.set_input(input, 1).unwrap();
        assert_settled!(c);
        c.set_input(input, 0).unwrap();
        assert_settled!(c);
    }

    #[test]
    fn test_sr_latch() {
        let mut c = Circuit::new();

        let s = c.input("s", 1);
        let r = c.input("r", 1);

        let q = sr_latch(&mut c, s, r, "latchy latch").unwrap();

        let out = c.output("out", 1);
        c.connect(q, out).unwrap();
        pulse(&mut c, r);

        assert_eq!(c.output_value("out"), Some(0));

        for i in 0..10 {
            if i % 2 == 0 {
                pulse(&mut c, s);
                assert_eq!(c.output_value("out"), Some(1));
            } else {
                pulse(&mut c, r);
                assert_eq!(c.output_value("out"), Some(0));
            }
        }
    }

    #[test]
    fn test_holding_state_is_stable() {
        let mut c = Circuit::new();
        let s = c.input("s", 1);
        let r = c.input("r", 1);
        let q = sr_latch(&mut c, s, r, "latch").unwrap();
        let out = c.output("out", 1);
        c.connect(q, out).unwrap();

        pulse(&mut c, s);
        assert_eq!(c.run().unwrap(), RunOutcome::Stable { ticks: 11 });
        assert_eq!(c.output_value("out"), Some(1));
    }
}
