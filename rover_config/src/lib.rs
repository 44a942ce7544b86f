#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the simulation harness and capture-file parsing.
//!
//! - `Config` and its tables are deserialized from TOML and validated.
//! - The control constants (tick length, speeds, thresholds, window size)
//!   are compiled into `rover_core` and are deliberately absent here.
//! - Capture files are tab-separated `x<TAB>y<TAB>z` rows without a header.
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// One accelerometer sample from a capture file.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CaptureRow {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    /// End the run after this many ticks; absent runs until Ctrl-C.
    pub max_ticks: Option<u64>,
    /// Seeds the random walk and the obstacle field; absent uses OS entropy.
    pub seed: Option<u64>,
    /// Pace ticks to wall-clock time instead of running as fast as possible.
    pub realtime: bool,
    /// Per-tick chance an obstacle appears near one flank.
    pub obstacle_rate: f64,
    /// How long an obstacle stays in range, in ticks.
    pub obstacle_ticks: u32,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            max_ticks: Some(2_000),
            seed: None,
            realtime: false,
            obstacle_rate: 0.02,
            obstacle_ticks: 6,
        }
    }
}

/// How the supervisor ships telemetry to the robot.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// One reading per tick.
    #[default]
    Single,
    /// One full window per message.
    Batch,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SupervisorCfg {
    pub delivery: Delivery,
    /// Capture file to replay; absent streams a synthetic vibration signal.
    pub capture: Option<PathBuf>,
    /// Peak amplitude of the synthetic signal.
    pub amplitude: f32,
    /// Packets each radio link buffers before dropping.
    pub radio_capacity: usize,
}

impl Default for SupervisorCfg {
    fn default() -> Self {
        Self {
            delivery: Delivery::Single,
            capture: None,
            amplitude: 0.5,
            radio_capacity: 64,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelCfg {
    /// Per-class RMS signature centres, in label order.
    pub class_rms: Vec<f32>,
}

impl Default for ModelCfg {
    fn default() -> Self {
        Self {
            class_rms: vec![0.05, 0.3, 0.8],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RunnerCfg {
    /// Print run statistics after the loop ends.
    pub stats: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sim: SimCfg,
    pub supervisor: SupervisorCfg,
    pub model: ModelCfg,
    pub logging: Logging,
    pub runner: RunnerCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sim
        if self.sim.max_ticks == Some(0) {
            eyre::bail!("sim.max_ticks must be >= 1 (omit it to run until interrupted)");
        }
        if !(0.0..=1.0).contains(&self.sim.obstacle_rate) {
            eyre::bail!("sim.obstacle_rate must be in [0.0, 1.0]");
        }
        if self.sim.obstacle_ticks == 0 {
            eyre::bail!("sim.obstacle_ticks must be >= 1");
        }

        // Supervisor
        if !(self.supervisor.amplitude.is_finite() && self.supervisor.amplitude >= 0.0) {
            eyre::bail!("supervisor.amplitude must be finite and >= 0");
        }
        if self.supervisor.radio_capacity == 0 {
            eyre::bail!("supervisor.radio_capacity must be >= 1");
        }
        if self.supervisor.radio_capacity > 1 << 16 {
            eyre::bail!("supervisor.radio_capacity is unreasonably large (>65536)");
        }

        // Model
        if self.model.class_rms.is_empty() {
            eyre::bail!("model.class_rms must list at least one class");
        }
        if self
            .model
            .class_rms
            .iter()
            .any(|c| !(c.is_finite() && *c >= 0.0))
        {
            eyre::bail!("model.class_rms entries must be finite and >= 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }
        Ok(())
    }
}

/// Load a tab-separated capture file of `x y z` rows.
///
/// Line numbers in errors are 1-based. Blank files are rejected since a
/// supervisor with nothing to send is a misconfiguration.
pub fn load_capture_tsv(path: &Path) -> eyre::Result<Vec<CaptureRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open capture file {:?}: {}", path, e))?;

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CaptureRow>().enumerate() {
        match rec {
            Ok(row) if row.x.is_finite() && row.y.is_finite() && row.z.is_finite() => {
                rows.push(row);
            }
            Ok(_) => eyre::bail!("capture row {} holds a non-finite value", idx + 1),
            Err(e) => eyre::bail!("invalid capture row {}: {}", idx + 1, e),
        }
    }
    if rows.is_empty() {
        eyre::bail!("capture file {:?} contains no rows", path);
    }
    Ok(rows)
}
