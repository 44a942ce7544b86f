//! Simulated devices for the rover control loop.
//!
//! Everything here implements the `rover_traits` boundary so the control
//! loop can run end to end without a physics engine or a trained network.
pub mod error;
pub mod model;
pub mod radio;
pub mod world;

pub use model::RmsSignatureModel;
pub use world::{Peer, SimWorld};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rover_traits::{ProximitySensors, SENSOR_COUNT, WheelMotors};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::HwError;

/// Sensors on the left flank of an e-puck style ring.
const LEFT_FLANK: [usize; 3] = [5, 6, 7];
/// Sensors on the right flank.
const RIGHT_FLANK: [usize; 3] = [0, 1, 2];

struct FieldState {
    values: [f64; SENSOR_COUNT],
    rng: ChaCha8Rng,
    obstacle_rate: f64,
    obstacle_ticks: u32,
    // (sensor index, ticks left)
    obstacle: Option<(usize, u32)>,
    // set() froze the readings
    pinned: bool,
}

/// Proximity readings that the world refreshes once per step.
///
/// Readings sit at a low ambient level; with probability `obstacle_rate` per
/// step an obstacle appears in front of one flank sensor and stays for
/// `obstacle_ticks` steps.
#[derive(Clone)]
pub struct ProximityField {
    state: Rc<RefCell<FieldState>>,
}

impl ProximityField {
    pub fn new(obstacle_rate: f64, obstacle_ticks: u32, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(ChaCha8Rng::from_entropy, |s| {
            ChaCha8Rng::seed_from_u64(s.wrapping_add(1))
        });
        Self {
            state: Rc::new(RefCell::new(FieldState {
                values: [0.0; SENSOR_COUNT],
                rng,
                obstacle_rate: obstacle_rate.clamp(0.0, 1.0),
                obstacle_ticks: obstacle_ticks.max(1),
                obstacle: None,
                pinned: false,
            })),
        }
    }

    /// Sensor handle reading this field.
    pub fn sensors(&self) -> SimulatedProximity {
        SimulatedProximity {
            state: self.state.clone(),
        }
    }

    /// Pin every sensor to fixed values (scripted scenarios, tests).
    pub fn set(&self, values: [f64; SENSOR_COUNT]) {
        let mut st = self.state.borrow_mut();
        st.values = values;
        st.obstacle = None;
        st.pinned = true;
    }

    /// Refresh the readings for the next step.
    pub fn advance(&self) {
        let mut st = self.state.borrow_mut();
        if st.pinned {
            return;
        }
        let st = &mut *st;
        let current = st.obstacle;
        st.obstacle = match current {
            Some((idx, left)) if left > 1 => Some((idx, left - 1)),
            Some(_) => None,
            None if st.obstacle_rate > 0.0 && st.rng.gen_bool(st.obstacle_rate) => {
                let flank = if st.rng.gen_bool(0.5) {
                    LEFT_FLANK
                } else {
                    RIGHT_FLANK
                };
                let idx = flank[st.rng.gen_range(0..flank.len())];
                tracing::debug!(sensor = idx, ticks = st.obstacle_ticks, "obstacle appeared");
                Some((idx, st.obstacle_ticks))
            }
            None => None,
        };
        for v in st.values.iter_mut() {
            *v = st.rng.gen_range(50.0..75.0);
        }
        if let Some((idx, _)) = st.obstacle {
            st.values[idx] = st.rng.gen_range(120.0..400.0);
        }
    }
}

pub struct SimulatedProximity {
    state: Rc<RefCell<FieldState>>,
}

impl ProximitySensors for SimulatedProximity {
    fn read(&mut self) -> [f64; SENSOR_COUNT] {
        self.state.borrow().values
    }
}

/// Wheel pair that clamps and records the last command.
pub struct SimulatedWheels {
    max_speed: f64,
    last: Rc<Cell<(f64, f64)>>,
    commands: Rc<Cell<u64>>,
}

/// Read-only view of what the wheels were last told to do.
#[derive(Clone)]
pub struct WheelProbe {
    last: Rc<Cell<(f64, f64)>>,
    commands: Rc<Cell<u64>>,
}

impl WheelProbe {
    pub fn last(&self) -> (f64, f64) {
        self.last.get()
    }

    pub fn commands(&self) -> u64 {
        self.commands.get()
    }
}

impl SimulatedWheels {
    pub fn new(max_speed: f64) -> Self {
        Self {
            max_speed: max_speed.abs(),
            last: Rc::new(Cell::new((0.0, 0.0))),
            commands: Rc::new(Cell::new(0)),
        }
    }

    pub fn probe(&self) -> WheelProbe {
        WheelProbe {
            last: self.last.clone(),
            commands: self.commands.clone(),
        }
    }
}

impl WheelMotors for SimulatedWheels {
    fn set_velocity(
        &mut self,
        left: f64,
        right: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !left.is_finite() || !right.is_finite() {
            return Err(Box::new(HwError::Motor(format!(
                "non-finite velocity ({left}, {right})"
            ))));
        }
        let clamp = |v: f64| v.clamp(-self.max_speed, self.max_speed);
        self.last.set((clamp(left), clamp(right)));
        self.commands.set(self.commands.get().saturating_add(1));
        tracing::trace!(left, right, "wheel velocity (simulated)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_field_stays_below_threshold() {
        let field = ProximityField::new(0.0, 10, Some(7));
        field.set([60.0; SENSOR_COUNT]);
        let mut sensors = field.sensors();
        for _ in 0..100 {
            field.advance();
            assert!(sensors.read().iter().all(|v| *v <= 80.0));
        }
    }

    #[test]
    fn obstacles_appear_on_a_flank() {
        let field = ProximityField::new(1.0, 3, Some(11));
        let mut sensors = field.sensors();
        field.advance();
        let values = sensors.read();
        let hot: Vec<usize> = (0..SENSOR_COUNT).filter(|i| values[*i] > 80.0).collect();
        assert_eq!(hot.len(), 1);
        assert!(LEFT_FLANK.contains(&hot[0]) || RIGHT_FLANK.contains(&hot[0]));
    }

    #[test]
    fn wheels_clamp_and_count() {
        let mut wheels = SimulatedWheels::new(6.28);
        let probe = wheels.probe();
        wheels.set_velocity(10.0, -10.0).unwrap();
        assert_eq!(probe.last(), (6.28, -6.28));
        assert_eq!(probe.commands(), 1);
        assert!(wheels.set_velocity(f64::NAN, 0.0).is_err());
        assert_eq!(probe.commands(), 1);
    }
}
