use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::aggregator::Aggregator;
use crate::core::config::AppConfig;
use crate::core::models::usage::AggregatedSnapshot;
use crate::core::scheduler::{PassFn, Scheduler, SchedulerState};

/// Run the polling scheduler in the foreground, printing every published
/// snapshot. Enter on stdin requests an immediate refresh; Ctrl-C exits.
pub async fn run(
    interval_override: Option<u64>,
    opts: &OutputOptions,
    debug_override: bool,
) -> Result<()> {
    let config = AppConfig::load().unwrap_or_default();
    let mut interval = interval_override.unwrap_or_else(|| config.effective_poll_interval());

    let aggregator = Arc::new(Aggregator::new());
    let pass: PassFn = Arc::new(move || {
        let aggregator = aggregator.clone();
        Box::pin(async move {
            // Fresh config read per pass, so saved settings apply on the
            // next cycle without restarting the daemon.
            let mut config = AppConfig::load().unwrap_or_default();
            if debug_override {
                config.debug = true;
            }
            aggregator.run_pass_with(&config).await
        })
    });

    let scheduler = Scheduler::start(interval, pass);
    let mut snapshots = scheduler.subscribe();

    if matches!(opts.format, OutputFormat::Text) {
        eprintln!(
            "Polling every {} minute(s). Enter = refresh now, Ctrl-C = quit.",
            interval
        );
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    print_snapshot(&snapshot, opts)?;
                }
                // Pick up a changed poll interval from the config store,
                // unless the command line pinned one.
                if interval_override.is_none() {
                    let configured =
                        AppConfig::load().unwrap_or_default().effective_poll_interval();
                    if configured != interval {
                        interval = configured;
                        scheduler.set_interval(interval);
                        eprintln!("Poll interval changed to {} minute(s).", interval);
                    }
                }
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    if scheduler.state() == SchedulerState::Running {
                        eprintln!("A pass is already running; refresh queued.");
                    }
                    scheduler.refresh_now();
                }
                _ => stdin_open = false,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    scheduler.shutdown().await;
    Ok(())
}

fn print_snapshot(snapshot: &AggregatedSnapshot, opts: &OutputOptions) -> Result<()> {
    match opts.format {
        OutputFormat::Text => {
            println!("── {} ──", Local::now().format("%H:%M:%S"));
            let text = renderer::render_snapshot(snapshot, opts.use_color);
            if text.is_empty() {
                println!("  (no provider data)");
            } else {
                println!("{}", text);
            }
            println!();
        }
        OutputFormat::Json => {
            // One snapshot per line, pretty-printing makes no sense here.
            println!("{}", serde_json::to_string(snapshot)?);
        }
    }
    Ok(())
}
