//! Assemble the simulated world around the control loop and run it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use rover_config::{Config, Delivery};
use rover_core::config::{MAX_SPEED, MotionCfg, WINDOW_LEN};
use rover_core::{ControlLoop, TickStats};
use rover_hardware::radio;
use rover_hardware::{ProximityField, RmsSignatureModel, SimWorld, SimulatedWheels, WheelProbe};
use rover_traits::MonotonicClock;

use crate::cli::RtLock;
use crate::rt::setup_rt_once;
use crate::supervisor::{Source, Supervisor, SupervisorProbe};

/// Command-line overrides for one `run`.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub ticks: Option<u64>,
    pub seed: Option<u64>,
    pub delivery: Option<Delivery>,
    pub capture: Option<PathBuf>,
    pub realtime: bool,
    pub stats: bool,
}

impl Overrides {
    /// Fold the overrides into `cfg`; the result still needs `validate()`.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(t) = self.ticks {
            cfg.sim.max_ticks = Some(t);
        }
        if let Some(s) = self.seed {
            cfg.sim.seed = Some(s);
        }
        if let Some(d) = self.delivery {
            cfg.supervisor.delivery = d;
        }
        if let Some(p) = &self.capture {
            cfg.supervisor.capture = Some(p.clone());
        }
        cfg.sim.realtime |= self.realtime;
        cfg.runner.stats |= self.stats;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RtOptions {
    pub enabled: bool,
    pub prio: Option<i32>,
    pub lock: RtLock,
    pub cpu: Option<usize>,
}

/// Everything `run` reports once the loop stops.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub stats: TickStats,
    pub labels_received: Vec<i32>,
    pub telemetry_sent: u64,
    pub telemetry_dropped: u64,
    pub wheel_commands: u64,
    pub last_command: (f64, f64),
}

pub fn load_config(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    rover_config::load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {e}", path.display()))
}

struct Assembled {
    control: ControlLoop,
    supervisor: SupervisorProbe,
    wheels: WheelProbe,
}

fn assemble(cfg: &Config, shutdown: Arc<AtomicBool>) -> eyre::Result<Assembled> {
    let source = match &cfg.supervisor.capture {
        Some(path) => {
            let rows = rover_config::load_capture_tsv(path)?;
            tracing::info!(path = %path.display(), rows = rows.len(), "capture loaded");
            Source::from_rows(&rows)
        }
        None => Source::Synthetic {
            amplitude: cfg.supervisor.amplitude,
        },
    };

    let (downlink_tx, downlink_rx) = radio::link(cfg.supervisor.radio_capacity);
    let (uplink_tx, uplink_rx) = radio::link(cfg.supervisor.radio_capacity);
    let supervisor = Supervisor::new(
        downlink_tx,
        uplink_rx,
        source,
        cfg.supervisor.delivery,
        WINDOW_LEN,
    );
    let supervisor_probe = supervisor.probe();

    let field = ProximityField::new(cfg.sim.obstacle_rate, cfg.sim.obstacle_ticks, cfg.sim.seed);
    let sensors = field.sensors();
    let mut world = SimWorld::new(field, cfg.sim.max_ticks).with_peer(supervisor);
    if cfg.sim.realtime {
        world = world.realtime(MonotonicClock::new());
    }
    let wheels = SimulatedWheels::new(MAX_SPEED);
    let wheel_probe = wheels.probe();

    let control = ControlLoop::builder()
        .with_scheduler(world)
        .with_sensors(sensors)
        .with_motors(wheels)
        .with_receiver(downlink_rx)
        .with_emitter(uplink_tx)
        .with_model(RmsSignatureModel::new(WINDOW_LEN, cfg.model.class_rms.clone()))
        .with_motion(MotionCfg {
            seed: cfg.sim.seed,
            ..MotionCfg::default()
        })
        .with_shutdown(shutdown)
        .try_build()?;

    Ok(Assembled {
        control,
        supervisor: supervisor_probe,
        wheels: wheel_probe,
    })
}

/// Build everything a run would, without ticking.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let assembled = assemble(cfg, Arc::new(AtomicBool::new(false)))?;
    tracing::info!(state = assembled.control.state().name(), "self-check passed");
    Ok(())
}

pub fn run(cfg: &Config, rt: RtOptions, shutdown: Arc<AtomicBool>) -> eyre::Result<RunOutcome> {
    setup_rt_once(rt.enabled, rt.prio, rt.lock, rt.cpu);

    let mut assembled = assemble(cfg, shutdown)?;
    tracing::info!(
        max_ticks = ?cfg.sim.max_ticks,
        seed = ?cfg.sim.seed,
        delivery = ?cfg.supervisor.delivery,
        realtime = cfg.sim.realtime,
        "run starting"
    );
    let stats = assembled.control.run()?;
    assembled.supervisor.drain();

    let outcome = RunOutcome {
        stats,
        labels_received: assembled.supervisor.labels(),
        telemetry_sent: assembled.supervisor.sent(),
        telemetry_dropped: assembled.supervisor.dropped(),
        wheel_commands: assembled.wheels.commands(),
        last_command: assembled.wheels.last(),
    };
    tracing::info!(
        ticks = outcome.stats.ticks,
        labels = outcome.stats.labels,
        overruns = outcome.stats.overruns,
        "run finished"
    );
    Ok(outcome)
}

pub fn outcome_json(o: &RunOutcome) -> serde_json::Value {
    let s = &o.stats;
    serde_json::json!({
        "ticks": s.ticks,
        "windows": s.windows,
        "labels": s.labels,
        "malformed": s.malformed,
        "inference_failures": s.inference_failures,
        "send_failures": s.send_failures,
        "actuator_failures": s.actuator_failures,
        "overruns": s.overruns,
        "latency_us": { "max": s.max_latency_us, "mean": s.mean_latency_us() },
        "modes": {
            "cruise": s.modes.cruise,
            "avoid_left": s.modes.avoid_left,
            "avoid_right": s.modes.avoid_right,
            "turn": s.modes.turn,
            "forward": s.modes.forward,
        },
        "maneuver_fraction": s.maneuver_fraction(),
        "supervisor": {
            "sent": o.telemetry_sent,
            "dropped": o.telemetry_dropped,
            "labels_received": o.labels_received.len(),
        },
        "wheel_commands": o.wheel_commands,
        "last_command": [o.last_command.0, o.last_command.1],
    })
}

/// Print run statistics to stdout.
pub fn print_stats(o: &RunOutcome) {
    let s = &o.stats;
    println!("--- Rover Stats ---");
    println!("Ticks: {}", s.ticks);
    println!(
        "Windows / labels: {} / {} (received by supervisor: {})",
        s.windows,
        s.labels,
        o.labels_received.len()
    );
    println!(
        "Dropped: malformed {} / inference {} / send {} / actuator {}",
        s.malformed, s.inference_failures, s.send_failures, s.actuator_failures
    );
    println!(
        "Tick latency max/mean (us): {} / {}",
        s.max_latency_us,
        s.mean_latency_us()
    );
    println!("Overruns (> time step): {}", s.overruns);
    println!(
        "Modes cruise/avoid_l/avoid_r/turn/forward: {} / {} / {} / {} / {}",
        s.modes.cruise, s.modes.avoid_left, s.modes.avoid_right, s.modes.turn, s.modes.forward
    );
    println!("Maneuver fraction: {:.3}", s.maneuver_fraction());
    println!("-------------------");
}
