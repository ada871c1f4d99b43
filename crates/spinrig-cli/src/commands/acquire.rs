//! Headless timed acquisition.
//!
//! Spawns a [`RigWorker`], waits for humidity to permit a start, then follows
//! the countdown until it expires.

use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use tokio::time::{Instant, sleep_until};
use tracing::{info, warn};

use spinrig_cli::config::Config;
use spinrig_core::{Command, RigEvent, RigHandle, RigWorker};
use spinrig_types::{Control, LinkStatus};

use crate::format::{FormatOptions, format_progress};
use crate::style;

/// Run one acquisition to completion.
///
/// Returns whether both relays were still reachable at the end.
pub async fn cmd_acquire(
    config: &Config,
    minutes: Option<u32>,
    wait: u64,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<bool> {
    let (worker, mut handle) = RigWorker::new(config.rig()?, config.worker_options())?;
    let worker = tokio::spawn(worker.run());

    let result = run_acquisition(&mut handle, minutes, wait, quiet, opts).await;

    // Closing the event channel keeps the worker from blocking on a send.
    handle.events.close();
    let _ = handle.send(Command::Shutdown).await;
    if let Err(e) = worker.await {
        warn!(error = %e, "Rig worker panicked");
    }
    result
}

async fn run_acquisition(
    handle: &mut RigHandle,
    minutes: Option<u32>,
    wait: u64,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<bool> {
    if let Some(minutes) = minutes {
        handle.send(Command::SetTimerMinutes(minutes)).await?;
    }

    let spinner = style::maybe_spinner(!quiet, "Waiting for humidity reading...");
    let deadline = (wait > 0).then(|| Instant::now() + Duration::from_secs(wait));

    loop {
        match next_event(handle, deadline).await? {
            RigEvent::Snapshot(snapshot) => {
                if snapshot.controls.is_enabled(Control::StartAcquisition) {
                    break;
                }
                if let Some(sp) = &spinner
                    && snapshot.reading_updated.is_some()
                {
                    sp.set_message(format!(
                        "Humidity {} is outside the allowed band, waiting...",
                        style::format_humidity(snapshot.reading.humidity, false, opts.no_color)
                    ));
                }
            }
            RigEvent::SensorFailed {
                error,
                consecutive_failures,
            } => {
                warn!(%error, consecutive_failures, "Sensor read failed");
            }
            RigEvent::Rejected(rejection) => bail!("Rejected: {}", rejection),
            _ => {}
        }
    }

    handle.send(Command::StartAcquisition).await?;

    let mut link = LinkStatus::Enabled;
    loop {
        match next_event(handle, None).await? {
            RigEvent::AcquisitionStarted { minutes } => {
                info!(minutes, "Acquisition started");
                if !quiet {
                    eprintln!("Acquisition started for {} min", minutes);
                }
            }
            RigEvent::Snapshot(snapshot) => {
                link = snapshot.link;
                if let Some(sp) = &spinner
                    && snapshot.is_acquiring()
                {
                    sp.set_message(format_progress(&snapshot, opts));
                }
            }
            RigEvent::CommandCompleted { command, outcome } => {
                report(&spinner, quiet, format!("{}: {}", command, outcome));
            }
            RigEvent::CommandFailed { command, error } => {
                report(&spinner, quiet, format!("{}: {}", command, error));
            }
            RigEvent::SensorFailed {
                error,
                consecutive_failures,
            } => {
                warn!(%error, consecutive_failures, "Sensor read failed");
            }
            RigEvent::Rejected(rejection) => bail!("Rejected: {}", rejection),
            RigEvent::AcquisitionFinished => break,
        }
    }

    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    println!("Acquisition complete");
    println!("{}", style::format_link(link, opts.no_color));
    Ok(link.is_enabled())
}

/// Print above the spinner when one is showing.
fn report(spinner: &Option<indicatif::ProgressBar>, quiet: bool, line: String) {
    if quiet {
        return;
    }
    match spinner {
        Some(sp) => sp.println(line),
        None => eprintln!("{}", line),
    }
}

async fn next_event(handle: &mut RigHandle, deadline: Option<Instant>) -> Result<RigEvent> {
    tokio::select! {
        event = handle.events.recv() => event.ok_or_else(|| anyhow!("Rig worker stopped")),
        _ = tokio::signal::ctrl_c() => bail!("Interrupted"),
        _ = wait_until(deadline) => bail!("Timed out waiting for humidity to come into band"),
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
