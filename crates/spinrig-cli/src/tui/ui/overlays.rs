//! Help and protocol overlays.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::protocol::{REMINDERS, TITLE};

/// `percent` of `len`, computed wide so large terminals cannot overflow.
fn percent_of(len: u16, percent: u16) -> u16 {
    u16::try_from(u32::from(len) * u32::from(percent) / 100).unwrap_or(u16::MAX)
}

/// A centered rectangle `percent_x` by `percent_y` of `area`, at least
/// `min_width` by `min_height` when the screen allows it.
fn centered(area: Rect, percent_x: u16, percent_y: u16, min_width: u16, min_height: u16) -> Rect {
    let width = percent_of(area.width, percent_x)
        .max(min_width)
        .min(area.width.saturating_sub(2));
    let height = percent_of(area.height, percent_y)
        .max(min_height)
        .min(area.height.saturating_sub(2));
    let x = area.x.saturating_add(area.width.saturating_sub(width) / 2);
    let y = area.y.saturating_add(area.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn shortcut_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:>10}  ", key),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(desc),
    ])
}

/// Draw help overlay with keyboard shortcuts.
pub(super) fn draw_help_overlay(frame: &mut Frame) {
    let area = centered(frame.area(), 60, 70, 44, 20);
    frame.render_widget(Clear, area);

    let lines = vec![
        shortcut_line("j/k ↓/↑", "Select control"),
        shortcut_line("Enter", "Activate selected"),
        shortcut_line("+/-", "Adjust selected value"),
        Line::from(""),
        shortcut_line("u d s", "Slider up/down/stop"),
        shortcut_line("←/→", "Belt left/right"),
        shortcut_line("v", "Set speed"),
        shortcut_line("z", "Set step size"),
        Line::from(""),
        shortcut_line("t/T", "Acquisition length +/-"),
        shortcut_line("g", "Start acquisition"),
        shortcut_line("r", "Read sensor now"),
        shortcut_line("p", "Sample prep reminders"),
        Line::from(""),
        shortcut_line("?", "Toggle help"),
        shortcut_line("q", "Quit"),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(help, area);
}

/// Draw the sample preparation reminders.
pub(super) fn draw_protocol_overlay(frame: &mut Frame) {
    let area = centered(frame.area(), 60, 60, 44, 12);
    frame.render_widget(Clear, area);

    let lines: Vec<Line> = REMINDERS
        .iter()
        .map(|reminder| Line::from(format!(" • {}", reminder)))
        .collect();

    let protocol = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", TITLE))
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(protocol, area);
}
