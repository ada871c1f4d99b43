//! Color helpers for the control panel.

use ratatui::style::{Color, Modifier, Style};

use spinrig_types::LinkStatus;

/// Green inside the humidity band, red outside it.
#[must_use]
pub fn humidity_color(in_band: bool) -> Color {
    if in_band { Color::Green } else { Color::Red }
}

/// Green while both relays are reachable, red otherwise.
#[must_use]
pub fn link_color(link: LinkStatus) -> Color {
    if link.is_enabled() {
        Color::Green
    } else {
        Color::Red
    }
}

/// Style for one control row.
#[must_use]
pub fn control_style(enabled: bool, selected: bool) -> Style {
    let style = if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    if selected {
        style.add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        style
    }
}

/// Yellow while counting down, cyan when idle.
#[must_use]
pub fn timer_color(running: bool) -> Color {
    if running { Color::Yellow } else { Color::Cyan }
}
