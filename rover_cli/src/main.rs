mod cli;
mod error_fmt;
mod logging;
mod rt;
mod run;
mod supervisor;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::{Overrides, RtOptions};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(err) = real_main(cli) {
        tracing::error!(error = %err, "rover failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let mut cfg = run::load_config(&cli.config)?;

    match cli.cmd {
        Commands::SelfCheck => {
            cfg.validate()?;
            let _log_guard = logging::init(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
            run::self_check(&cfg)?;
            if cli.json {
                println!("{}", serde_json::json!({ "self_check": "ok" }));
            } else {
                println!("self-check ok");
            }
            Ok(())
        }
        Commands::Run {
            ticks,
            seed,
            delivery,
            capture,
            realtime,
            stats,
            rt,
            rt_prio,
            rt_lock,
            rt_cpu,
        } => {
            Overrides {
                ticks,
                seed,
                delivery: delivery.map(Into::into),
                capture,
                realtime,
                stats,
            }
            .apply(&mut cfg);
            cfg.validate()?;
            let _log_guard = logging::init(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = Arc::clone(&shutdown);
                if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                    tracing::warn!(error = %e, "Ctrl-C handler not installed");
                }
            }

            let outcome = run::run(
                &cfg,
                RtOptions {
                    enabled: rt,
                    prio: rt_prio,
                    lock: rt_lock,
                    cpu: rt_cpu,
                },
                shutdown,
            )?;

            if cli.json {
                println!("{}", run::outcome_json(&outcome));
            } else if cfg.runner.stats {
                run::print_stats(&outcome);
            } else {
                println!(
                    "run complete: {} ticks, {} labels",
                    outcome.stats.ticks, outcome.stats.labels
                );
            }
            Ok(())
        }
    }
}
