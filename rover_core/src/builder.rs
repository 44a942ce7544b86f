//! Builder for `ControlLoop`.
//!
//! Every device is required; `try_build()` checks presence, validates the
//! motion and tick configuration, and checks the model's declared shapes
//! against the window once so the loop never has to.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use rover_traits::{
    Clock, LabelEmitter, MonotonicClock, ProximitySensors, SENSOR_COUNT, Scheduler,
    SignatureModel, TelemetryReceiver, WheelMotors,
};

use crate::classify::ClassificationPipeline;
use crate::config::{MotionCfg, TickCfg, WindowCfg};
use crate::error::{BuildError, Result};
use crate::motion::RandomWalk;
use crate::proximity::ProximitySensing;
use crate::runner::ControlLoop;
use crate::stats::TickStats;
use crate::window::TelemetryWindower;

#[derive(Default)]
pub struct ControlLoopBuilder {
    scheduler: Option<Box<dyn Scheduler>>,
    sensors: Option<Box<dyn ProximitySensors>>,
    motors: Option<Box<dyn WheelMotors>>,
    receiver: Option<Box<dyn TelemetryReceiver>>,
    emitter: Option<Box<dyn LabelEmitter>>,
    model: Option<Box<dyn SignatureModel>>,
    motion: Option<MotionCfg>,
    window: Option<WindowCfg>,
    tick: Option<TickCfg>,
    clock: Option<Box<dyn Clock>>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for ControlLoopBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoopBuilder")
            .field("motion", &self.motion)
            .field("window", &self.window)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl ControlLoopBuilder {
    pub fn with_scheduler(mut self, s: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(s));
        self
    }

    pub fn with_sensors(mut self, s: impl ProximitySensors + 'static) -> Self {
        self.sensors = Some(Box::new(s));
        self
    }

    pub fn with_motors(mut self, m: impl WheelMotors + 'static) -> Self {
        self.motors = Some(Box::new(m));
        self
    }

    pub fn with_receiver(mut self, r: impl TelemetryReceiver + 'static) -> Self {
        self.receiver = Some(Box::new(r));
        self
    }

    pub fn with_emitter(mut self, e: impl LabelEmitter + 'static) -> Self {
        self.emitter = Some(Box::new(e));
        self
    }

    pub fn with_model(mut self, m: impl SignatureModel + 'static) -> Self {
        self.model = Some(Box::new(m));
        self
    }

    pub fn with_motion(mut self, cfg: MotionCfg) -> Self {
        self.motion = Some(cfg);
        self
    }

    pub fn with_window(mut self, cfg: WindowCfg) -> Self {
        self.window = Some(cfg);
        self
    }

    pub fn with_tick(mut self, cfg: TickCfg) -> Self {
        self.tick = Some(cfg);
        self
    }

    /// Clock used to measure tick latency. Defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Flag polled once per tick; setting it ends `run()` before the next step.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    pub fn try_build(self) -> Result<ControlLoop> {
        let scheduler = self
            .scheduler
            .ok_or_else(|| eyre::Report::new(BuildError::MissingScheduler))?;
        let sensors = self
            .sensors
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensors))?;
        let motors = self
            .motors
            .ok_or_else(|| eyre::Report::new(BuildError::MissingMotors))?;
        let receiver = self
            .receiver
            .ok_or_else(|| eyre::Report::new(BuildError::MissingReceiver))?;
        let emitter = self
            .emitter
            .ok_or_else(|| eyre::Report::new(BuildError::MissingEmitter))?;
        let model = self
            .model
            .ok_or_else(|| eyre::Report::new(BuildError::MissingModel))?;

        let motion = self.motion.unwrap_or_default();
        let window = self.window.unwrap_or_default();
        let tick = self.tick.unwrap_or_default();
        validate_motion(&motion)?;
        if window.window_len == 0 {
            return Err(invalid("window_len must be >= 1"));
        }
        if tick.time_step.is_zero() {
            return Err(invalid("time_step must be > 0"));
        }

        let pipeline = ClassificationPipeline::new(model, emitter, &window)?;
        tracing::debug!(
            window_len = window.window_len,
            time_step_ms = u64::try_from(tick.time_step.as_millis()).unwrap_or(u64::MAX),
            seed = ?motion.seed,
            "control loop assembled"
        );

        Ok(ControlLoop {
            scheduler,
            proximity: ProximitySensing::new(sensors),
            motors,
            receiver,
            windower: TelemetryWindower::new(window.window_len),
            pipeline,
            walk: RandomWalk::new(motion),
            tick_cfg: tick,
            clock: self
                .clock
                .unwrap_or_else(|| Box::new(MonotonicClock::new()) as Box<dyn Clock>),
            shutdown: self.shutdown,
            stats: TickStats::default(),
        })
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate_motion(m: &MotionCfg) -> Result<()> {
    if !(m.max_speed.is_finite() && m.max_speed > 0.0) {
        return Err(invalid("max_speed must be finite and > 0"));
    }
    if !(m.speed_fraction > 0.0 && m.speed_fraction <= 1.0) {
        return Err(invalid("speed_fraction must be in (0, 1]"));
    }
    if !(m.obstacle_threshold.is_finite() && m.obstacle_threshold >= 0.0) {
        return Err(invalid("obstacle_threshold must be finite and >= 0"));
    }
    if !(0.0..=1.0).contains(&m.maneuver_probability) {
        return Err(invalid("maneuver_probability must be in [0, 1]"));
    }
    if m.left_sensors
        .iter()
        .chain(m.right_sensors.iter())
        .any(|&i| i >= SENSOR_COUNT)
    {
        return Err(invalid("sensor index out of range"));
    }
    for (lo, hi) in [m.turn_ticks, m.forward_ticks] {
        if lo == 0 || lo > hi {
            return Err(invalid("maneuver tick range must satisfy 1 <= min <= max"));
        }
    }
    Ok(())
}
