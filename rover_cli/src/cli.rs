//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "rover", version, about = "Rover control loop (simulated world)")]
pub struct Cli {
    /// Path to harness config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/rover.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to
    /// logging.level from the config, then "info". RUST_LOG wins over both.
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Memory locking mode for real-time operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RtLock {
    /// Do not lock memory
    None,
    /// Lock currently resident pages
    Current,
    /// Lock current and future pages
    All,
}

/// Telemetry shape the simulated supervisor sends.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DeliveryArg {
    Single,
    Batch,
}

impl From<DeliveryArg> for rover_config::Delivery {
    fn from(d: DeliveryArg) -> Self {
        match d {
            DeliveryArg::Single => Self::Single,
            DeliveryArg::Batch => Self::Batch,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive the robot through the simulated world until it ends or Ctrl-C
    Run {
        /// Override sim.max_ticks
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Override sim.seed (random walk and obstacle field)
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
        /// Override supervisor.delivery
        #[arg(long, value_enum, value_name = "SHAPE")]
        delivery: Option<DeliveryArg>,
        /// Override supervisor.capture: tab-separated x/y/z file to replay
        #[arg(long, value_name = "FILE")]
        capture: Option<PathBuf>,
        /// Pace ticks to wall-clock time (overrides sim.realtime)
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Print run statistics on completion
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
        /// Enable real-time mode (SCHED_FIFO, affinity, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux: SCHED_FIFO priority, pin to one CPU, and mlockall to keep the process resident. Needs CAP_SYS_NICE / CAP_IPC_LOCK or root; failures are reported as warnings and the run continues."
        )]
        rt: bool,
        /// Real-time priority for SCHED_FIFO (clamped to the system range)
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
        /// Memory locking mode for --rt
        #[arg(long, value_enum, value_name = "MODE", default_value = "current")]
        rt_lock: RtLock,
        /// CPU index to pin to for --rt (default 0)
        #[arg(long, value_name = "CPU")]
        rt_cpu: Option<usize>,
    },
    /// Validate config and assemble the loop without ticking
    SelfCheck,
}
