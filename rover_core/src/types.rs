//! Data model shared by the control loop stages.

use rover_traits::SENSOR_COUNT;

use crate::error::RoverError;

/// One acceleration reading (x, y, z).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Triple {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Triple {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Triple {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Proximity values for the current tick, one per sensor.
///
/// Values are non-negative; negative or non-finite device readings are
/// treated as "nothing in range" (0.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityReading([f64; SENSOR_COUNT]);

impl ProximityReading {
    pub fn from_raw(raw: [f64; SENSOR_COUNT]) -> Self {
        Self(raw.map(|v| if v.is_finite() && v > 0.0 { v } else { 0.0 }))
    }

    #[inline]
    pub fn values(&self) -> &[f64; SENSOR_COUNT] {
        &self.0
    }

    /// True when any of `sensors` reads strictly above `threshold`.
    /// Out-of-range indices are ignored.
    pub fn any_above(&self, sensors: &[usize], threshold: f64) -> bool {
        sensors
            .iter()
            .filter_map(|i| self.0.get(*i))
            .any(|v| *v > threshold)
    }
}

/// Exactly `window_len` readings, consumed whole by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryWindow {
    samples: Vec<Triple>,
}

impl TelemetryWindow {
    /// Build a window, rejecting anything that is not exactly `window_len` long.
    pub fn try_new(samples: Vec<Triple>, window_len: usize) -> Result<Self, RoverError> {
        if samples.len() != window_len {
            return Err(RoverError::ShapeMismatch {
                expected: window_len,
                actual: samples.len(),
            });
        }
        Ok(Self { samples })
    }

    /// Caller guarantees the length invariant.
    pub(crate) fn from_complete(samples: Vec<Triple>) -> Self {
        Self { samples }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn samples(&self) -> &[Triple] {
        &self.samples
    }
}

/// Index of the highest class score for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassificationResult {
    pub label: i32,
}

/// Wheel velocities for one tick, bounded to `[-max, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorCommand {
    pub left: f64,
    pub right: f64,
}

impl ActuatorCommand {
    /// Clamp both wheels into `[-max_speed, max_speed]`. Non-finite inputs become 0.
    pub fn bounded(left: f64, right: f64, max_speed: f64) -> Self {
        let max = max_speed.abs();
        let clamp = |v: f64| if v.is_finite() { v.clamp(-max, max) } else { 0.0 };
        Self {
            left: clamp(left),
            right: clamp(right),
        }
    }
}

/// Mode the motion state machine was in for the last tick.
///
/// Timed modes carry the ticks still to run after the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    #[default]
    Cruise,
    AvoidLeft,
    AvoidRight,
    TurnMicro {
        remaining: u32,
    },
    ForwardMicro {
        remaining: u32,
    },
}

impl MotionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cruise => "cruise",
            Self::AvoidLeft => "avoid_left",
            Self::AvoidRight => "avoid_right",
            Self::TurnMicro { .. } => "turn_micro",
            Self::ForwardMicro { .. } => "forward_micro",
        }
    }

    #[inline]
    pub fn is_maneuver(&self) -> bool {
        matches!(self, Self::TurnMicro { .. } | Self::ForwardMicro { .. })
    }
}
