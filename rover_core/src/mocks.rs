//! Test doubles for the device traits.
//!
//! Shared handles (`Rc<RefCell<..>>`) let a test keep inspecting a device
//! after the loop has taken ownership of it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use rover_traits::{
    LabelEmitter, ProximitySensors, Scheduler, SENSOR_COUNT, SignatureModel, TelemetryReceiver,
    Tick, WheelMotors,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Tick source that advances a fixed number of times, then shuts down.
#[derive(Debug, Clone)]
pub struct StepLimit {
    left: u64,
}

impl StepLimit {
    pub fn new(ticks: u64) -> Self {
        Self { left: ticks }
    }
}

impl Scheduler for StepLimit {
    fn step(&mut self, _time_step: Duration) -> Tick {
        if self.left == 0 {
            return Tick::Shutdown;
        }
        self.left -= 1;
        Tick::Advanced
    }
}

/// Proximity array whose values a test can change between ticks.
#[derive(Debug, Clone)]
pub struct FixedProximity {
    values: Rc<RefCell<[f64; SENSOR_COUNT]>>,
}

impl FixedProximity {
    pub fn new(values: [f64; SENSOR_COUNT]) -> Self {
        Self {
            values: Rc::new(RefCell::new(values)),
        }
    }

    /// All sensors at `v`.
    pub fn uniform(v: f64) -> Self {
        Self::new([v; SENSOR_COUNT])
    }

    pub fn set(&self, values: [f64; SENSOR_COUNT]) {
        *self.values.borrow_mut() = values;
    }
}

impl ProximitySensors for FixedProximity {
    fn read(&mut self) -> [f64; SENSOR_COUNT] {
        *self.values.borrow()
    }
}

/// Motors that record every command, optionally failing every write.
#[derive(Debug, Clone, Default)]
pub struct RecordingMotors {
    log: Rc<RefCell<Vec<(f64, f64)>>>,
    fail: bool,
}

impl RecordingMotors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<(f64, f64)> {
        self.log.borrow().clone()
    }
}

impl WheelMotors for RecordingMotors {
    fn set_velocity(&mut self, left: f64, right: f64) -> Result<(), BoxError> {
        if self.fail {
            return Err("motor driver offline".into());
        }
        self.log.borrow_mut().push((left, right));
        Ok(())
    }
}

/// Inbound queue a test pushes packets into.
#[derive(Debug, Clone, Default)]
pub struct QueueReceiver {
    queue: Rc<RefCell<VecDeque<Vec<u8>>>>,
}

impl QueueReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, packet: impl Into<Vec<u8>>) {
        self.queue.borrow_mut().push_back(packet.into());
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl TelemetryReceiver for QueueReceiver {
    fn next_packet(&mut self) -> Option<Vec<u8>> {
        self.queue.borrow_mut().pop_front()
    }
}

/// Outbound channel that keeps every payload, or rejects them all.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitter {
    sent: Rc<RefCell<Vec<Vec<u8>>>>,
    fail: bool,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.borrow().clone()
    }
}

impl LabelEmitter for RecordingEmitter {
    fn send(&mut self, payload: &[u8]) -> Result<(), BoxError> {
        if self.fail {
            return Err("radio link down".into());
        }
        self.sent.borrow_mut().push(payload.to_vec());
        Ok(())
    }
}

/// Model returning the same scores for every window.
#[derive(Debug, Clone)]
pub struct StubModel {
    shape: Vec<usize>,
    scores: Vec<f32>,
    fail: bool,
    calls: Rc<RefCell<Vec<Vec<f32>>>>,
}

impl StubModel {
    /// Model over `window_len x 3` inputs that always returns `scores`.
    pub fn new(window_len: usize, scores: Vec<f32>) -> Self {
        Self {
            shape: vec![window_len, 3],
            scores,
            fail: false,
            calls: Rc::default(),
        }
    }

    /// Declare an arbitrary input shape.
    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = shape;
        self
    }

    /// Every `infer` call errors.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Inputs seen so far, oldest first.
    pub fn inputs(&self) -> Vec<Vec<f32>> {
        self.calls.borrow().clone()
    }
}

impl SignatureModel for StubModel {
    fn input_shape(&self) -> &[usize] {
        &self.shape
    }

    fn output_len(&self) -> usize {
        self.scores.len()
    }

    fn infer(&mut self, input: &[f32]) -> Result<Vec<f32>, BoxError> {
        self.calls.borrow_mut().push(input.to_vec());
        if self.fail {
            return Err("runtime rejected tensor".into());
        }
        Ok(self.scores.clone())
    }
}
