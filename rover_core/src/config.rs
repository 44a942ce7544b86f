//! Compiled-in configuration of the control loop.
//!
//! The constants are the reference configuration; the structs expose them
//! through `Default` so tests and the builder can pass them around.

use std::time::Duration;

/// Length of one simulation step.
pub const TIME_STEP: Duration = Duration::from_millis(64);
/// Wheel velocity limit (rad/s).
pub const MAX_SPEED: f64 = 6.28;
/// A proximity value above this means "obstacle".
pub const OBSTACLE_THRESHOLD: f64 = 80.0;
/// Every motion command runs the wheels at this fraction of `MAX_SPEED`.
pub const SPEED_FRACTION: f64 = 0.5;
/// Sensors watching the left flank.
pub const LEFT_SENSORS: [usize; 3] = [5, 6, 7];
/// Sensors watching the right flank.
pub const RIGHT_SENSORS: [usize; 3] = [0, 1, 2];
/// Per-tick chance of leaving Cruise for a random-walk maneuver.
pub const MANEUVER_PROBABILITY: f64 = 0.1;
/// Inclusive bounds of an in-place turn, in ticks.
pub const TURN_TICKS: (u32, u32) = (5, 20);
/// Inclusive bounds of the forward burst that follows a turn, in ticks.
pub const FORWARD_TICKS: (u32, u32) = (20, 50);
/// Readings per telemetry window.
pub const WINDOW_LEN: usize = 24;
/// Axes per telemetry reading.
pub const AXES: usize = 3;

/// Obstacle-avoidance and random-walk parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionCfg {
    pub max_speed: f64,
    pub speed_fraction: f64,
    pub obstacle_threshold: f64,
    pub left_sensors: [usize; 3],
    pub right_sensors: [usize; 3],
    pub maneuver_probability: f64,
    pub turn_ticks: (u32, u32),
    pub forward_ticks: (u32, u32),
    /// Seed for the maneuver RNG; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl MotionCfg {
    /// Wheel speed used by every command.
    #[inline]
    pub fn cruise_speed(&self) -> f64 {
        self.max_speed * self.speed_fraction
    }
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            speed_fraction: SPEED_FRACTION,
            obstacle_threshold: OBSTACLE_THRESHOLD,
            left_sensors: LEFT_SENSORS,
            right_sensors: RIGHT_SENSORS,
            maneuver_probability: MANEUVER_PROBABILITY,
            turn_ticks: TURN_TICKS,
            forward_ticks: FORWARD_TICKS,
            seed: None,
        }
    }
}

/// Telemetry window shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowCfg {
    pub window_len: usize,
}

impl WindowCfg {
    /// Length of the flattened feature vector.
    #[inline]
    pub fn flat_len(&self) -> usize {
        self.window_len * AXES
    }
}

impl Default for WindowCfg {
    fn default() -> Self {
        Self {
            window_len: WINDOW_LEN,
        }
    }
}

/// Tick scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickCfg {
    /// Simulated time per tick; also the wall-clock budget for a tick's work.
    pub time_step: Duration,
}

impl Default for TickCfg {
    fn default() -> Self {
        Self {
            time_step: TIME_STEP,
        }
    }
}
