use std::time::Duration;

use crate::types::MotionState;

/// Ticks spent in each motion mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeTicks {
    pub cruise: u64,
    pub avoid_left: u64,
    pub avoid_right: u64,
    pub turn: u64,
    pub forward: u64,
}

impl ModeTicks {
    pub fn record(&mut self, state: MotionState) {
        match state {
            MotionState::Cruise => self.cruise += 1,
            MotionState::AvoidLeft => self.avoid_left += 1,
            MotionState::AvoidRight => self.avoid_right += 1,
            MotionState::TurnMicro { .. } => self.turn += 1,
            MotionState::ForwardMicro { .. } => self.forward += 1,
        }
    }
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub ticks: u64,
    pub windows: u64,
    pub labels: u64,
    pub malformed: u64,
    pub inference_failures: u64,
    pub send_failures: u64,
    pub actuator_failures: u64,
    /// Ticks whose work took longer than one time step.
    pub overruns: u64,
    pub max_latency_us: u64,
    pub total_latency_us: u64,
    pub modes: ModeTicks,
}

impl TickStats {
    pub(crate) fn record_latency(&mut self, latency: Duration) {
        let us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.max_latency_us = self.max_latency_us.max(us);
        self.total_latency_us = self.total_latency_us.saturating_add(us);
    }

    pub fn mean_latency_us(&self) -> u64 {
        if self.ticks == 0 {
            0
        } else {
            self.total_latency_us / self.ticks
        }
    }

    /// Share of ticks spent in a turn or forward burst.
    #[allow(clippy::cast_precision_loss)]
    pub fn maneuver_fraction(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        (self.modes.turn + self.modes.forward) as f64 / self.ticks as f64
    }
}
