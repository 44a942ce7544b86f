//! Tracing subscriber setup: console (pretty or JSON) plus an optional
//! rotating JSON-lines file.

use std::path::Path;

use rover_config::Logging;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use tracing_appender::non_blocking::WorkerGuard;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn rotation(name: Option<&str>) -> Rotation {
    match name {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    }
}

fn file_layer(path: &Path, rot: Rotation) -> eyre::Result<(BoxedLayer, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre::eyre!("logging.file {:?} has no file name", path))?;
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(rot, dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .boxed();
    Ok((layer, guard))
}

/// Install the global subscriber. Console output goes to stderr so stdout
/// stays clean for results.
///
/// The returned guard flushes the log file when dropped; hold it until exit.
pub fn init(
    json: bool,
    cli_level: Option<&str>,
    cfg: &Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    let level = cli_level.or(cfg.level.as_deref()).unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| eyre::eyre!("invalid log level {level:?}: {e}"))?,
    };

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    layers.push(if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_target(false).with_writer(std::io::stderr).boxed()
    });
    let mut guard = None;
    if let Some(file) = cfg.file.as_deref() {
        let (layer, g) = file_layer(Path::new(file), rotation(cfg.rotation.as_deref()))?;
        layers.push(layer);
        guard = Some(g);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| eyre::eyre!("install tracing subscriber: {e}"))?;
    Ok(guard)
}
