//! Event-driven simulation of multi-bit digital logic circuits.
//!
//! A [Circuit] is an arena of nodes joined by edges between named ports. Values propagate through a work
//! queue until the circuit settles or the iteration cap is hit, clocks are driven by [Circuit::tick] and
//! [Circuit::run]. Reusable sub-circuits are frozen into a [Template] and copied in with
//! [Circuit::instantiate].
//!
//! ```
//! use logicgraph::*;
//!
//! let mut c = Circuit::new();
//! let a = c.input("a", 1);
//! let b = c.input("b", 1);
//! let (sum, carry) = half_adder(&mut c, a, b, "ha").unwrap();
//! let sum_out = c.output("sum", 1);
//! let carry_out = c.output("carry", 1);
//! c.connect(sum, sum_out).unwrap();
//! c.connect(carry, carry_out).unwrap();
//!
//! c.set_input(a, 1).unwrap();
//! c.set_input(b, 1).unwrap();
//! assert!(c.run().unwrap().is_stable());
//! assert_eq!(c.output_values(), vec![0, 1]);
//! ```
#[macro_use]
pub mod graph;
pub mod bits;
pub mod circuits;
pub mod data_structures;
mod config;
mod error;
mod events;
mod runner;

pub use bits::Value;
pub use circuits::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use graph::*;
pub use runner::{FreeRunner, RunnerExit, StopHandle};

/// Installs a [tracing_subscriber] formatter filtered by `level`, `RUST_LOG` takes precedence when set.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .try_init();
}
