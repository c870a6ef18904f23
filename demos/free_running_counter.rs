use logicgraph::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const TOGGLE_EVERY: Duration = Duration::from_secs(3);
const POLL: Duration = Duration::from_millis(50);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    logicgraph::init_logging(&config.log_level);
    let bits = 4;

    let mut c = Circuit::named("counter");
    c.set_config(config);
    let clock = c.clock("clk", 10.0);
    let enable = c.input("enable", 1);
    let count = counter(&mut c, clock, enable, bits, "cnt")?;
    let out = c.output("count", bits);
    c.connect(count, out)?;
    c.set_input(enable, 1)?;

    let stop = c.stop_handle();
    ctrlc::set_handler(move || stop.stop())?;

    let runner = FreeRunner::for_circuit(&c).ok_or("circuit has no clock")?;
    let circuit = Arc::new(Mutex::new(c));

    // Pause counting for a while every few seconds.
    let toggler = {
        let circuit = circuit.clone();
        let stop = circuit.lock().stop_handle();
        thread::spawn(move || -> Result<(), SimError> {
            let mut enabled = true;
            let mut waited = Duration::ZERO;
            while !stop.is_stopped() {
                thread::sleep(POLL);
                waited += POLL;
                if waited >= TOGGLE_EVERY {
                    waited = Duration::ZERO;
                    enabled = !enabled;
                    circuit.lock().set_input(enable, enabled as Value)?;
                }
            }
            Ok(())
        })
    };

    let exit = runner.run_shared(&circuit, |c| {
        let value = c.output_value("count").unwrap_or_default();
        if value == 0 {
            colour::green_ln!("{:0width$b}", value, width = bits as usize);
        } else {
            colour::dark_grey_ln!("{:0width$b}", value, width = bits as usize);
        }
    })?;
    match toggler.join() {
        Ok(result) => result?,
        Err(_) => colour::e_red_ln!("enable toggler panicked"),
    }
    colour::yellow_ln!("{:?}", exit);
    Ok(())
}
