use logicgraph::*;

fn main() -> Result<(), SimError> {
    logicgraph::init_logging("warn");
    let bits = 16;
    let adder = ripple_carry_adder(&full_adder()?, bits)?;

    let mut c = Circuit::named("bench");
    let add = c.instantiate(&adder);
    let a = c.input("a", bits);
    let b = c.input("b", bits);
    let sum = c.output("sum", bits);
    let cout = c.output("cout", 1);
    c.connect(a, add.input("a")?)?;
    c.connect(b, add.input("b")?)?;
    c.connect(add.output("sum")?, sum)?;
    c.connect(add.output("cout")?, cout)?;

    c.set_input(b, 10000)?;
    c.step()?;

    let t = std::time::Instant::now();
    let mut iterations = 0;
    let mut res = 0;

    for i in 0..10000 {
        c.set_input(a, i)?;
        iterations += c.settle_changes()?.iterations;

        res = c.output_value("sum").unwrap_or_default();
    }

    let d = t.elapsed().as_micros();
    println!(
        "Result: {}, carry: {}, iterations:{}, duration: {}us, {:.2}us/i",
        res,
        c.output_value("cout").unwrap_or_default(),
        iterations,
        d,
        d as f64 / iterations as f64
    );
    Ok(())
}
