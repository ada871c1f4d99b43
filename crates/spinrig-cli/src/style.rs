//! Visual styling utilities for the CLI.
//!
//! Spinners for relay runs and colors for the link label.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use spinrig_types::LinkStatus;

/// Standard spinner tick characters (Braille dots animation)
const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

/// Get the standard spinner style.
fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .expect("valid template")
        .tick_chars(SPINNER_TICK_CHARS)
}

/// Create a spinner for generic operations.
pub fn operation_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

/// Spinner only when stderr is a terminal and output is not quiet.
pub fn maybe_spinner(show: bool, message: &str) -> Option<ProgressBar> {
    use std::io::IsTerminal;

    (show && std::io::stderr().is_terminal()).then(|| operation_spinner(message))
}

/// Link label in green when enabled, red otherwise.
#[must_use]
pub fn format_link(link: LinkStatus, no_color: bool) -> String {
    if no_color {
        link.label().to_string()
    } else if link.is_enabled() {
        format!("{}", link.label().green())
    } else {
        format!("{}", link.label().red())
    }
}

/// Humidity in green when inside the band, red otherwise.
#[must_use]
pub fn format_humidity(humidity: f64, in_band: bool, no_color: bool) -> String {
    let text = format!("{:.1}%", humidity);
    if no_color {
        text
    } else if in_band {
        format!("{}", text.green())
    } else {
        format!("{}", text.red())
    }
}
