//! Wall clock scheduling of clocked ticks.
use crate::error::SimError;
use crate::graph::Circuit;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Cloneable handle that asks a running [Circuit] to stop between ticks.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The stop flag owned by a circuit. Cloning a circuit gives the clone its own flag.
#[derive(Debug, Default)]
pub(crate) struct StopFlag(StopHandle);

impl StopFlag {
    pub(crate) fn handle(&self) -> StopHandle {
        self.0.clone()
    }
}

impl Clone for StopFlag {
    fn clone(&self) -> Self {
        Default::default()
    }
}

impl std::ops::Deref for StopFlag {
    type Target = StopHandle;
    fn deref(&self) -> &StopHandle {
        &self.0
    }
}

/// Why a [FreeRunner] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerExit {
    Stopped { ticks: usize },
    TickLimit { ticks: usize },
}

/// Ticks a circuit at a fixed wall clock period until it is stopped.
///
/// # Example
///
/// ```
/// # use logicgraph::*;
/// # use std::time::Duration;
/// let mut c = Circuit::new();
/// let clk = c.clock("clk", 1000.0);
/// let out = c.output("out", 1);
/// c.connect(clk, out).unwrap();
///
/// let runner = FreeRunner::new(Duration::from_millis(1)).with_max_ticks(3);
/// let mut ticks = 0;
/// let exit = runner.run(&mut c, |_| ticks += 1).unwrap();
///
/// assert_eq!(exit, RunnerExit::TickLimit { ticks: 3 });
/// assert_eq!(ticks, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRunner {
    pub period: Duration,
    /// Ticks after which the runner returns on its own, [None] to run until stopped.
    pub max_ticks: Option<usize>,
}

impl FreeRunner {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            max_ticks: None,
        }
    }

    /// Runner ticking at the rate of the circuit's fastest clock, [None] if it has no running clock.
    pub fn for_circuit(circuit: &Circuit) -> Option<Self> {
        circuit.clock_period().map(Self::new)
    }

    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    fn done(&self, ticks: usize) -> bool {
        self.max_ticks.map_or(false, |max| ticks >= max)
    }

    fn pace(&self, started: Instant) {
        if let Some(left) = self.period.checked_sub(started.elapsed()) {
            thread::sleep(left);
        }
    }

    /// Ticks `circuit`, calling `on_tick` after every tick, until its stop flag is raised or the tick
    /// limit is reached.
    pub fn run<F: FnMut(&Circuit)>(
        &self,
        circuit: &mut Circuit,
        mut on_tick: F,
    ) -> Result<RunnerExit, SimError> {
        let stop = circuit.stop_handle();
        stop.reset();
        info!(period = ?self.period, "free running");
        let mut ticks = 0;
        loop {
            if stop.is_stopped() {
                info!(ticks, "free run stopped");
                return Ok(RunnerExit::Stopped { ticks });
            }
            if self.done(ticks) {
                return Ok(RunnerExit::TickLimit { ticks });
            }
            let started = Instant::now();
            circuit.tick()?;
            ticks += 1;
            on_tick(circuit);
            debug!(ticks, "free run tick");
            self.pace(started);
        }
    }

    /// Like [FreeRunner::run] but locks `circuit` only for the duration of each tick, so other threads can
    /// drive inputs in between.
    pub fn run_shared<F: FnMut(&Circuit)>(
        &self,
        circuit: &Mutex<Circuit>,
        mut on_tick: F,
    ) -> Result<RunnerExit, SimError> {
        let stop = circuit.lock().stop_handle();
        stop.reset();
        let mut ticks = 0;
        loop {
            if stop.is_stopped() {
                info!(ticks, "free run stopped");
                return Ok(RunnerExit::Stopped { ticks });
            }
            if self.done(ticks) {
                return Ok(RunnerExit::TickLimit { ticks });
            }
            let started = Instant::now();
            {
                let mut circuit = circuit.lock();
                circuit.tick()?;
                on_tick(&circuit);
            }
            ticks += 1;
            self.pace(started);
        }
    }
}
