//! Obstacle avoidance with a random walk layered underneath.
//!
//! Every tick the walk samples proximity and produces one wheel command:
//!
//! 1. any left-flank sensor above threshold: rotate right (`AvoidLeft`)
//! 2. else any right-flank sensor above threshold: rotate left (`AvoidRight`)
//! 3. else the active maneuver's command, or cruise straight ahead
//!
//! Only a cruising robot rolls for a new maneuver. A maneuver is a turn in
//! place for a random number of ticks followed by a straight burst. Obstacle
//! ticks override a maneuver's output but do not pause its countdown.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::MotionCfg;
use crate::types::{ActuatorCommand, MotionState, ProximityReading};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Maneuver {
    /// `left` is the left wheel velocity; the right wheel gets its negation.
    Turn { remaining: u32, left: f64 },
    Forward { remaining: u32 },
}

#[derive(Debug)]
pub struct RandomWalk {
    cfg: MotionCfg,
    rng: ChaCha8Rng,
    maneuver: Option<Maneuver>,
    state: MotionState,
}

impl RandomWalk {
    pub fn new(mut cfg: MotionCfg) -> Self {
        let p = cfg.maneuver_probability;
        cfg.maneuver_probability = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        let rng = cfg
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        Self {
            cfg,
            rng,
            maneuver: None,
            state: MotionState::Cruise,
        }
    }

    /// Mode reported for the most recent tick.
    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// True while a turn or forward burst is committed, even if an obstacle
    /// is overriding its output this tick.
    #[inline]
    pub fn in_maneuver(&self) -> bool {
        self.maneuver.is_some()
    }

    #[inline]
    pub fn cfg(&self) -> &MotionCfg {
        &self.cfg
    }

    pub fn tick(&mut self, reading: &ProximityReading) -> ActuatorCommand {
        let speed = self.cfg.cruise_speed();
        let threshold = self.cfg.obstacle_threshold;
        let left_hit = reading.any_above(&self.cfg.left_sensors, threshold);
        let right_hit = !left_hit && reading.any_above(&self.cfg.right_sensors, threshold);

        if self.maneuver.is_none()
            && !left_hit
            && !right_hit
            && self.rng.gen_bool(self.cfg.maneuver_probability)
        {
            let remaining = self.draw(self.cfg.turn_ticks);
            let left = if self.rng.gen_bool(0.5) { speed } else { -speed };
            tracing::debug!(ticks = remaining, left, "maneuver: turn");
            self.maneuver = Some(Maneuver::Turn { remaining, left });
        }

        let planned = self.advance_maneuver(speed);
        let (state, left, right) = if left_hit {
            (MotionState::AvoidLeft, speed, -speed)
        } else if right_hit {
            (MotionState::AvoidRight, -speed, speed)
        } else {
            planned
        };

        if std::mem::discriminant(&state) != std::mem::discriminant(&self.state) {
            tracing::trace!(from = self.state.name(), to = state.name(), "motion mode");
        }
        self.state = state;
        ActuatorCommand::bounded(left, right, self.cfg.max_speed)
    }

    /// Consume one tick of the active maneuver and return its command.
    fn advance_maneuver(&mut self, speed: f64) -> (MotionState, f64, f64) {
        match self.maneuver {
            None => (MotionState::Cruise, speed, speed),
            Some(Maneuver::Turn { remaining, left }) => {
                let remaining = remaining.saturating_sub(1);
                self.maneuver = if remaining == 0 {
                    let ticks = self.draw(self.cfg.forward_ticks);
                    tracing::debug!(ticks, "maneuver: forward");
                    Some(Maneuver::Forward { remaining: ticks })
                } else {
                    Some(Maneuver::Turn { remaining, left })
                };
                (MotionState::TurnMicro { remaining }, left, -left)
            }
            Some(Maneuver::Forward { remaining }) => {
                let remaining = remaining.saturating_sub(1);
                self.maneuver = (remaining > 0).then_some(Maneuver::Forward { remaining });
                (MotionState::ForwardMicro { remaining }, speed, speed)
            }
        }
    }

    fn draw(&mut self, (a, b): (u32, u32)) -> u32 {
        self.rng.gen_range(a.min(b)..=a.max(b)).max(1)
    }
}
