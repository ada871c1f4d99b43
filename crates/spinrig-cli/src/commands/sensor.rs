//! Sensor read command implementation.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use spinrig_cli::config::Config;
use spinrig_core::SensorPoller;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_reading_json, format_reading_line, format_reading_text};

/// Arguments for the sensor command
pub struct SensorArgs {
    pub format: OutputFormat,
    pub watch: bool,
    /// Readings to take in watch mode (0 for unlimited).
    pub count: u32,
    /// Seconds between readings in watch mode.
    pub interval: Option<u64>,
}

pub async fn cmd_sensor(config: &Config, args: SensorArgs, opts: &FormatOptions) -> Result<()> {
    let mut poller = SensorPoller::new(config.sensor_relay()?);

    if !args.watch {
        let reading = poller.poll().await.context("Failed to read sensor")?;
        let in_band = config.humidity.admits(&reading);
        let content = match args.format {
            OutputFormat::Text => format_reading_text(&reading, in_band, opts),
            OutputFormat::Json => format_reading_json(&reading, in_band)?,
        };
        print!("{}", content);
        io::stdout().flush()?;
        return Ok(());
    }

    let period = Duration::from_secs(
        args.interval
            .unwrap_or(config.sensor.interval_secs)
            .max(1),
    );
    info!(?period, count = args.count, "Watching sensor");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut taken = 0u32;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }

        match poller.poll().await {
            Ok(reading) => {
                let in_band = config.humidity.admits(&reading);
                let content = match args.format {
                    OutputFormat::Text => format_reading_line(&reading, in_band, opts),
                    OutputFormat::Json => format_reading_json(&reading, in_band)?,
                };
                print!("{}", content);
                io::stdout().flush()?;
            }
            Err(e) => warn!(
                error = %e,
                failures = poller.consecutive_failures(),
                "Sensor read failed"
            ),
        }

        taken += 1;
        if args.count > 0 && taken >= args.count {
            break;
        }
    }

    Ok(())
}
