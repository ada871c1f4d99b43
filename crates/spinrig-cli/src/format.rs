//! Output formatting utilities for text and JSON output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use spinrig_core::RigSnapshot;
use spinrig_types::{LinkStatus, RelayOutcome, RigCommand, SensorReading};

use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }
}

/// Result of sending one command, as reported to the operator.
#[derive(Debug, Clone, Serialize)]
pub struct SendResult {
    pub command: RigCommand,
    /// Classified relay output, absent when the relay never ran.
    pub outcome: Option<RelayOutcome>,
    pub error: Option<String>,
    pub link: LinkStatus,
}

impl SendResult {
    pub fn succeeded(&self) -> bool {
        self.link.is_enabled()
    }
}

#[must_use]
pub fn format_send_text(result: &SendResult, opts: &FormatOptions) -> String {
    let detail = match (&result.outcome, &result.error) {
        (Some(outcome), _) => outcome.to_string(),
        (None, Some(error)) => error.clone(),
        (None, None) => String::new(),
    };
    let command = if opts.no_color {
        result.command.to_string()
    } else {
        format!("{}", result.command.to_string().bold())
    };
    format!(
        "{}: {}\n{}\n",
        command,
        detail,
        style::format_link(result.link, opts.no_color)
    )
}

pub fn format_send_json(result: &SendResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)? + "\n")
}

#[derive(Debug, Serialize)]
struct ReadingJson<'a> {
    #[serde(flatten)]
    reading: &'a SensorReading,
    humidity_in_band: bool,
}

#[must_use]
pub fn format_reading_text(reading: &SensorReading, in_band: bool, opts: &FormatOptions) -> String {
    format!(
        "Temperature: {:.1} °F\nHumidity:    {}\n",
        reading.temperature,
        style::format_humidity(reading.humidity, in_band, opts.no_color)
    )
}

/// One-line reading for watch mode.
#[must_use]
pub fn format_reading_line(reading: &SensorReading, in_band: bool, opts: &FormatOptions) -> String {
    format!(
        "{:.1} °F  {}\n",
        reading.temperature,
        style::format_humidity(reading.humidity, in_band, opts.no_color)
    )
}

pub fn format_reading_json(reading: &SensorReading, in_band: bool) -> Result<String> {
    let json = ReadingJson {
        reading,
        humidity_in_band: in_band,
    };
    Ok(serde_json::to_string(&json)? + "\n")
}

/// Countdown status line for a running acquisition.
#[must_use]
pub fn format_progress(snapshot: &RigSnapshot, opts: &FormatOptions) -> String {
    format!(
        "{} remaining | {:.1} °F {} | {}",
        snapshot.timer.display(),
        snapshot.reading.temperature,
        style::format_humidity(
            snapshot.reading.humidity,
            snapshot.humidity_in_band,
            opts.no_color
        ),
        style::format_link(snapshot.link, opts.no_color)
    )
}

#[must_use]
pub fn format_protocol(opts: &FormatOptions) -> String {
    let title = if opts.no_color {
        spinrig_cli::protocol::TITLE.to_string()
    } else {
        format!("{}", spinrig_cli::protocol::TITLE.bold())
    };
    let mut out = format!("{}\n", title);
    for reminder in spinrig_cli::protocol::REMINDERS {
        out.push_str(&format!("  - {}\n", reminder));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinrig_types::{BeltCommand, SliderCommand};

    const PLAIN: FormatOptions = FormatOptions { no_color: true };

    #[test]
    fn test_format_send_text_success() {
        let result = SendResult {
            command: BeltCommand::SetSpeed(120).into(),
            outcome: Some(RelayOutcome::Success),
            error: None,
            link: LinkStatus::Enabled,
        };
        assert_eq!(
            format_send_text(&result, &PLAIN),
            "belt speed 120: message passed\nBluetooth Enabled\n"
        );
        assert!(result.succeeded());
    }

    #[test]
    fn test_format_send_text_error() {
        let result = SendResult {
            command: SliderCommand::Up.into(),
            outcome: None,
            error: Some("Failed to run relay 'sudo': not found".to_string()),
            link: LinkStatus::PumpDisabled,
        };
        let text = format_send_text(&result, &PLAIN);
        assert!(text.contains("Failed to run relay"));
        assert!(text.ends_with("Bluetooth Pump Disabled\n"));
        assert!(!result.succeeded());
    }

    #[test]
    fn test_format_send_json() {
        let result = SendResult {
            command: SliderCommand::Stop.into(),
            outcome: Some(RelayOutcome::DeviceNotFound),
            error: None,
            link: LinkStatus::PumpDisabled,
        };
        let json = format_send_json(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcome"], "device_not_found");
        assert_eq!(value["link"], "pump_disabled");
        assert_eq!(value["command"]["actuator"], "slider");
    }

    #[test]
    fn test_format_reading_text() {
        let reading = SensorReading::new(72.0, 45.5);
        assert_eq!(
            format_reading_text(&reading, true, &PLAIN),
            "Temperature: 72.0 °F\nHumidity:    45.5%\n"
        );
    }

    #[test]
    fn test_format_reading_json() {
        let json = format_reading_json(&SensorReading::new(72.0, 60.0), false).unwrap();
        assert_eq!(
            json,
            "{\"temperature\":72.0,\"humidity\":60.0,\"humidity_in_band\":false}\n"
        );
    }

    #[test]
    fn test_format_protocol_lists_all_reminders() {
        let text = format_protocol(&PLAIN);
        assert!(text.starts_with("Sample Prep Reminders\n"));
        assert_eq!(text.lines().count(), 9);
        assert!(text.contains("Set current to 14 microAmps"));
    }
}
