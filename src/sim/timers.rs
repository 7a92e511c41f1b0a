//! Per-entity cooldown table
//!
//! Locks and delayed resets count down with the simulation's `dt` instead of
//! wall-clock timeouts, so they are reproducible and die with their entity.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Dash is locked while running
    DashLock,
    /// Shooting is locked while running
    ShootLock,
    /// Contact damage is locked while running
    ContactLock,
    /// Zero the accelerator when this expires
    AcceleratorReset,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    running: Vec<(TimerKind, f32)>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a timer
    pub fn start(&mut self, kind: TimerKind, seconds: f32) {
        match self.running.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, remaining)) => *remaining = seconds,
            None => self.running.push((kind, seconds)),
        }
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        self.running.iter().any(|(k, _)| *k == kind)
    }

    pub fn remaining(&self, kind: TimerKind) -> Option<f32> {
        self.running.iter().find(|(k, _)| *k == kind).map(|(_, r)| *r)
    }

    /// Count every timer down by `dt`; returns the ones that expired
    pub fn advance(&mut self, dt: f32) -> Vec<TimerKind> {
        let mut expired = Vec::new();
        self.running.retain_mut(|(kind, remaining)| {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*kind);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }
}
