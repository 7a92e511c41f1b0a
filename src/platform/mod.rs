//! Platform layer
//!
//! Turns variable frame times into fixed simulation ticks, and (on wasm32)
//! exposes the simulation to JavaScript.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::SimResult;
use crate::sim::{Simulation, TickSummary};

/// Longest frame we try to catch up on; anything beyond is dropped
const MAX_FRAME_DT: f32 = 0.1;

/// Fixed-timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedStepper {
    accumulator: f32,
    step: f32,
    max_substeps: u32,
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedStepper {
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            accumulator: 0.0,
            step,
            max_substeps,
        }
    }

    /// Run as many whole ticks as `frame_dt` pays for. Returns the summary
    /// of the last tick run, if any.
    pub fn advance(&mut self, sim: &mut Simulation, frame_dt: f32) -> SimResult<Option<TickSummary>> {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut last = None;
        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            last = Some(sim.update(self.step)?);
            self.accumulator -= self.step;
            substeps += 1;
        }
        if substeps == self.max_substeps && self.accumulator >= self.step {
            log::debug!("dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        Ok(last)
    }

    /// Forget any partial step, e.g. after the tab was hidden
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
