use crate::engine::Simulation;
use crate::render::Renderer;
use anyhow::{Context, Result};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

/// Cloneable flag that stops a running [`Driver`] before its next tick.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Repeats ticks on a fixed cadence until stopped.
///
/// Deadlines advance by whole intervals from the start, so a slow tick
/// shortens the following wait instead of shifting every later tick.
/// Ticks never overlap.
pub struct Driver {
    interval: Duration,
    max_ticks: Option<u64>,
    stop: StopHandle,
}

impl Driver {
    pub fn new(interval: Duration, max_ticks: Option<u64>) -> Self {
        Self {
            interval,
            max_ticks,
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run ticks and hand every frame to `renderer`.
    ///
    /// Returns the number of ticks executed.
    pub fn run(&self, sim: &mut Simulation, renderer: &mut dyn Renderer) -> Result<u64> {
        log::info!(
            "starting driver (interval {:?}, max ticks {:?})",
            self.interval,
            self.max_ticks
        );

        let mut n_ticks = 0;
        let mut deadline = Instant::now();

        while !self.stop.is_stopped() && self.max_ticks.is_none_or(|max| n_ticks < max) {
            let frame = sim.tick();
            renderer
                .render(&frame)
                .with_context(|| format!("failed to render tick {}", frame.tick))?;
            n_ticks += 1;

            if self.max_ticks == Some(n_ticks) {
                break;
            }

            deadline += self.interval;
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            } else {
                deadline = now;
            }
        }

        log::info!("stopped driver after {n_ticks} ticks");

        Ok(n_ticks)
    }
}
