#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Onboard control loop (hardware-agnostic).
//!
//! All device interaction goes through the `rover_traits` boundary, so the
//! same loop runs against the simulator, real hardware or test doubles.
//!
//! ## Architecture
//!
//! - **Proximity sensing**: one sanitized reading per tick (`proximity`)
//! - **Motion**: obstacle avoidance over a seeded random walk (`motion`)
//! - **Protocol**: inbound telemetry text, outbound 4-byte labels (`protocol`)
//! - **Windowing**: fixed-size telemetry windows (`window`)
//! - **Classification**: flatten, infer, argmax, emit (`classify`)
//! - **Scheduling**: the tick loop and its statistics (`runner`, `stats`)

pub mod builder;
pub mod classify;
pub mod config;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod motion;
pub mod protocol;
pub mod proximity;
pub mod runner;
pub mod stats;
pub mod types;
pub mod window;

pub use builder::ControlLoopBuilder;
pub use classify::{ClassificationPipeline, argmax, flatten};
pub use config::{MotionCfg, TickCfg, WindowCfg};
pub use error::{BuildError, Result, RoverError};
pub use motion::RandomWalk;
pub use protocol::WireFormat;
pub use runner::{ControlLoop, TickReport};
pub use stats::{ModeTicks, TickStats};
pub use types::{
    ActuatorCommand, ClassificationResult, MotionState, ProximityReading, TelemetryWindow, Triple,
};
pub use window::TelemetryWindower;
