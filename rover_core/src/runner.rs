//! The fixed-tick control loop.
//!
//! One tick, in order:
//!
//! 1. drain every pending telemetry packet into the windower, classifying
//!    and emitting a label for each window that completes
//! 2. sample proximity and advance the random walk
//! 3. write the wheel command
//!
//! Only the tick source blocks. Telemetry and actuator faults are logged and
//! counted; motion always proceeds, even on a tick that ends in a fatal
//! shape mismatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rover_traits::{Clock, Scheduler, TelemetryReceiver, Tick, WheelMotors};

use crate::builder::ControlLoopBuilder;
use crate::classify::ClassificationPipeline;
use crate::config::TickCfg;
use crate::error::{Result, RoverError};
use crate::hw_error::map_hw_error;
use crate::motion::RandomWalk;
use crate::proximity::ProximitySensing;
use crate::stats::TickStats;
use crate::types::{ActuatorCommand, MotionState};
use crate::window::TelemetryWindower;

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 1-based tick number.
    pub tick: u64,
    pub state: MotionState,
    pub command: ActuatorCommand,
    /// Labels emitted this tick, in window order.
    pub labels: Vec<i32>,
}

pub struct ControlLoop {
    pub(crate) scheduler: Box<dyn Scheduler>,
    pub(crate) proximity: ProximitySensing,
    pub(crate) motors: Box<dyn WheelMotors>,
    pub(crate) receiver: Box<dyn TelemetryReceiver>,
    pub(crate) windower: TelemetryWindower,
    pub(crate) pipeline: ClassificationPipeline,
    pub(crate) walk: RandomWalk,
    pub(crate) tick_cfg: TickCfg,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) shutdown: Option<Arc<AtomicBool>>,
    pub(crate) stats: TickStats,
}

impl std::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("state", &self.walk.state())
            .field("pending", &self.windower.pending())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl ControlLoop {
    pub fn builder() -> ControlLoopBuilder {
        ControlLoopBuilder::default()
    }

    /// Counters so far.
    pub fn stats(&self) -> TickStats {
        TickStats {
            send_failures: self.pipeline.send_failures(),
            ..self.stats
        }
    }

    #[inline]
    pub fn state(&self) -> MotionState {
        self.walk.state()
    }

    /// Readings waiting for the next window.
    #[inline]
    pub fn pending_readings(&self) -> usize {
        self.windower.pending()
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    /// Tick until the tick source or the shutdown flag says stop.
    ///
    /// Returns `Err` only for a shape mismatch, which means the loop was
    /// assembled with a model that cannot consume its windows.
    pub fn run(&mut self) -> Result<TickStats> {
        loop {
            if self.shutdown_requested() {
                tracing::info!(tick = self.stats.ticks, "shutdown requested");
                break;
            }
            if self.scheduler.step(self.tick_cfg.time_step) == Tick::Shutdown {
                tracing::info!(tick = self.stats.ticks, "tick source shut down");
                break;
            }
            self.tick()?;
        }
        Ok(self.stats())
    }

    /// Do one tick of work. The caller owns advancing the tick source.
    pub fn tick(&mut self) -> Result<TickReport> {
        let started = self.clock.now();
        self.stats.ticks += 1;
        let tick = self.stats.ticks;

        let (labels, fatal) = self.drain_telemetry(tick);

        let reading = self.proximity.read();
        let command = self.walk.tick(&reading);
        let state = self.walk.state();
        self.stats.modes.record(state);
        if let Err(e) = self.motors.set_velocity(command.left, command.right) {
            let err = map_hw_error(&*e, RoverError::Actuator);
            self.stats.actuator_failures += 1;
            tracing::warn!(tick, error = %err, "wheel command not applied");
        }

        let latency = self.clock.elapsed(started);
        self.stats.record_latency(latency);
        if latency > self.tick_cfg.time_step {
            self.stats.overruns += 1;
            tracing::warn!(
                tick,
                latency_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX),
                budget_ms = u64::try_from(self.tick_cfg.time_step.as_millis()).unwrap_or(u64::MAX),
                "tick overran its time step"
            );
        }
        tracing::trace!(tick, mode = state.name(), left = command.left, right = command.right);

        if let Some(e) = fatal {
            return Err(eyre::Report::new(e));
        }
        Ok(TickReport {
            tick,
            state,
            command,
            labels,
        })
    }

    /// Classify every window completed by the queued packets, in arrival
    /// order. A shape mismatch stops the drain and is handed back so the
    /// caller can finish the tick's motion before failing.
    fn drain_telemetry(&mut self, tick: u64) -> (Vec<i32>, Option<RoverError>) {
        let mut labels = Vec::new();
        while let Some(packet) = self.receiver.next_packet() {
            let window = match self.windower.ingest(&packet) {
                Ok(Some(w)) => w,
                Ok(None) => continue,
                Err(e) => {
                    self.stats.malformed += 1;
                    tracing::warn!(tick, reason = %e, "telemetry dropped");
                    continue;
                }
            };
            self.stats.windows += 1;
            match self.pipeline.classify(&window) {
                Ok(result) => {
                    self.stats.labels += 1;
                    labels.push(result.label);
                }
                Err(e @ RoverError::ShapeMismatch { .. }) => {
                    tracing::error!(tick, error = %e, "window does not fit the model");
                    return (labels, Some(e));
                }
                Err(e) => {
                    self.stats.inference_failures += 1;
                    tracing::error!(tick, error = %e, "classification skipped");
                }
            }
        }
        (labels, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        FixedProximity, QueueReceiver, RecordingEmitter, RecordingMotors, StepLimit, StubModel,
    };
    use crate::protocol::encode_batch;
    use crate::types::Triple;

    #[test]
    fn shape_mismatch_still_applies_the_wheel_command() {
        let rx = QueueReceiver::new();
        let motors = RecordingMotors::new();
        let mut ctl = ControlLoop::builder()
            .with_scheduler(StepLimit::new(1))
            .with_sensors(FixedProximity::uniform(10.0))
            .with_motors(motors.clone())
            .with_receiver(rx.clone())
            .with_emitter(RecordingEmitter::new())
            .with_model(StubModel::new(24, vec![1.0]))
            .try_build()
            .unwrap();
        // windows shorter than the model input cannot come out of a built
        // loop; swap the windower to force one
        ctl.windower = TelemetryWindower::new(2);
        rx.push(encode_batch(&[Triple::default(); 2]));

        let err = ctl.tick().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RoverError>(),
            Some(RoverError::ShapeMismatch { expected: 72, actual: 6 })
        ));
        assert_eq!(motors.commands().len(), 1);
        assert_eq!(ctl.stats().ticks, 1);
    }
}
