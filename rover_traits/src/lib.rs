//! Device boundary between the control loop and whatever drives it
//! (a simulator, real hardware, or a test double).

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::time::Duration;

/// Number of discrete range sensors around the chassis.
pub const SENSOR_COUNT: usize = 8;

/// Result of asking the tick source for the next simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Simulated time moved forward by one step.
    Advanced,
    /// The simulation is ending; the caller must stop ticking.
    Shutdown,
}

/// Owner of simulated time. `step` blocks until the next step is available.
pub trait Scheduler {
    fn step(&mut self, time_step: Duration) -> Tick;
}

pub trait ProximitySensors {
    /// One value per sensor, refreshed once per step. Never blocks.
    fn read(&mut self) -> [f64; SENSOR_COUNT];
}

pub trait WheelMotors {
    fn set_velocity(
        &mut self,
        left: f64,
        right: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Inbound packet queue (supervisor -> robot).
pub trait TelemetryReceiver {
    /// Pop the oldest pending packet, or `None` when the queue is empty.
    fn next_packet(&mut self) -> Option<Vec<u8>>;
}

/// Outbound fire-and-forget channel (robot -> supervisor).
pub trait LabelEmitter {
    fn send(&mut self, payload: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Opaque pre-trained classifier: fixed-shape input, fixed-length score vector.
///
/// Shapes are declared up front so callers can validate them once at load
/// time instead of on every call.
pub trait SignatureModel {
    /// Declared input shape, e.g. `[24, 3]`. The flattened length is the product.
    fn input_shape(&self) -> &[usize];
    /// Number of class scores returned by `infer`.
    fn output_len(&self) -> usize;
    fn infer(&mut self, input: &[f32]) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>>;
}
