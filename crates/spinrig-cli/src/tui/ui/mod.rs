//! Layout and rendering for the control panel.
//!
//! - **Header**: title and wall clock
//! - **Controls** (left): every panel control, dimmed while disabled
//! - **Status** (right): countdown, environment and the link label
//! - **Status bar**: last event or key hints

pub mod colors;

mod overlays;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use time::OffsetDateTime;
use time::macros::format_description;

use spinrig_types::Control;

use super::app::{App, PANEL};
use colors::{control_style, humidity_color, link_color, timer_color};

/// Draw the complete interface.
pub fn draw(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, main_layout[0], app);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(1)])
        .split(main_layout[1]);

    draw_controls(frame, content[0], app);
    draw_status_panel(frame, content[1], app);
    draw_status_bar(frame, main_layout[2], app);

    if app.show_help {
        overlays::draw_help_overlay(frame);
    }
    if app.show_protocol {
        overlays::draw_protocol_overlay(frame);
    }
}

fn clock_text(clock: Option<OffsetDateTime>) -> String {
    let format = format_description!("[hour]:[minute]:[second]");
    clock
        .and_then(|c| c.format(&format).ok())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// Header line in the panel's `Date: m/d/yyyy  Time: hh:mm:ss` layout.
fn date_time_text(clock: Option<OffsetDateTime>) -> String {
    let format = format_description!("[month padding:none]/[day padding:none]/[year]");
    let date = clock
        .and_then(|c| c.format(&format).ok())
        .unwrap_or_else(|| "-/-/----".to_string());
    format!("Date: {}  Time: {}", date, clock_text(clock))
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(34)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " spinrig ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" electrospinning control panel"),
    ]));
    frame.render_widget(title, layout[0]);

    let clock = Paragraph::new(date_time_text(app.snapshot.as_ref().map(|s| s.clock)))
        .alignment(Alignment::Right);
    frame.render_widget(clock, layout[1]);
}

/// Value shown beside a control, if it carries one.
fn control_value(app: &App, control: Control) -> Option<String> {
    match control {
        Control::SetSpeed => Some(app.speed.to_string()),
        Control::SetStep => Some(app.step.to_string()),
        Control::StartAcquisition => Some(format!("{} min", app.minutes)),
        _ => None,
    }
}

/// Section heading shown above the first control of each group.
fn group_heading(index: usize) -> Option<&'static str> {
    match index {
        0 => Some("Slider"),
        3 => Some("Belt"),
        7 => Some("Acquisition"),
        _ => None,
    }
}

fn draw_controls(frame: &mut Frame, area: Rect, app: &App) {
    let controls = app.controls();
    let mut lines = Vec::new();

    for (index, control) in PANEL.iter().enumerate() {
        if let Some(heading) = group_heading(index) {
            if index > 0 {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                heading,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let enabled = controls.is_enabled(*control);
        let selected = index == app.selected;
        let mut spans = vec![Span::styled(
            format!(" {:<18}", control.label()),
            control_style(enabled, selected),
        )];
        if let Some(value) = control_value(app, *control) {
            spans.push(Span::styled(
                format!(" [{}]", value),
                Style::default().fg(Color::Yellow),
            ));
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default().borders(Borders::ALL).title(" Controls ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status_panel(frame: &mut Frame, area: Rect, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    draw_timer(frame, layout[0], app);
    draw_environment(frame, layout[1], app);
    draw_link(frame, layout[2], app);
}

fn draw_timer(frame: &mut Frame, area: Rect, app: &App) {
    let (text, running) = match &app.snapshot {
        Some(snapshot) => (
            snapshot.timer.display().to_string(),
            snapshot.is_acquiring(),
        ),
        None => (format!("{}:00", app.minutes), false),
    };
    let state = if running { "Running" } else { "Idle" };

    let lines = vec![
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(timer_color(running))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(state, Style::default().fg(Color::Gray))),
    ];
    let block = Block::default().borders(Borders::ALL).title(" Timer ");
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );
}

fn draw_environment(frame: &mut Frame, area: Rect, app: &App) {
    let lines = match &app.snapshot {
        Some(snapshot) if snapshot.reading_updated.is_some() => {
            let reading = snapshot.reading;
            vec![
                Line::from(format!(" Temperature  {:.1} °F", reading.temperature)),
                Line::from(vec![
                    Span::raw(" Humidity     "),
                    Span::styled(
                        format!("{:.1}%", reading.humidity),
                        Style::default()
                            .fg(humidity_color(snapshot.humidity_in_band))
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!(" Updated      {}", clock_text(snapshot.reading_updated)),
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        }
        _ => vec![Line::from(Span::styled(
            " Waiting for sensor...",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let block = Block::default().borders(Borders::ALL).title(" Environment ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_link(frame: &mut Frame, area: Rect, app: &App) {
    let link = app.snapshot.as_ref().map(|s| s.link).unwrap_or_default();
    let label = Paragraph::new(Span::styled(
        link.label(),
        Style::default()
            .fg(link_color(link))
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(" Link "));
    frame.render_widget(label, area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.current_status_message() {
        Some(message) => Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Gray),
        )),
        None => {
            let hints = [
                ("Enter", "activate"),
                ("+/-", "adjust"),
                ("g", "start"),
                ("p", "protocol"),
                ("?", "help"),
                ("q", "quit"),
            ];
            let mut spans = vec![Span::raw(" ")];
            for (i, (key, desc)) in hints.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
                }
                spans.push(Span::styled(
                    *key,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(
                    format!(" {}", desc),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use spinrig_core::{HumidityBand, RigEvent, RigState, Timer};
    use spinrig_types::{ConnectionState, SensorReading, Actuator};
    use time::macros::datetime;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_clock_text() {
        assert_eq!(clock_text(None), "--:--:--");
        assert_eq!(clock_text(Some(OffsetDateTime::UNIX_EPOCH)), "00:00:00");
    }

    #[test]
    fn test_date_time_text() {
        assert_eq!(
            date_time_text(Some(OffsetDateTime::UNIX_EPOCH)),
            "Date: 1/1/1970  Time: 00:00:00"
        );
        let later = datetime!(2024-11-23 9:05:07 UTC);
        assert_eq!(date_time_text(Some(later)), "Date: 11/23/2024  Time: 09:05:07");
        assert_eq!(date_time_text(None), "Date: -/-/----  Time: --:--:--");
    }

    #[test]
    fn test_draw_before_first_snapshot() {
        let app = App::new(100, 300, 1);
        let screen = render(&app);
        assert!(screen.contains("Start Acquisition"));
        assert!(screen.contains("Waiting for sensor"));
        assert!(screen.contains("Bluetooth Enabled"));
        assert!(screen.contains("1:00"));
    }

    #[test]
    fn test_draw_shows_reading_and_link() {
        let mut state = RigState::new(Timer::default(), HumidityBand::default());
        state.apply_reading(
            SensorReading::new(72.0, 50.0),
            Some(OffsetDateTime::UNIX_EPOCH),
        );
        state.apply_connection(Actuator::Belt, ConnectionState::Disabled);

        let mut app = App::new(100, 300, 1);
        app.handle_rig_event(RigEvent::Snapshot(Box::new(
            state.snapshot(OffsetDateTime::UNIX_EPOCH),
        )));
        let screen = render(&app);
        assert!(screen.contains("72.0"));
        assert!(screen.contains("50.0%"));
        assert!(screen.contains("Bluetooth S.M. Disabled"));
        assert!(screen.contains("Date: 1/1/1970  Time: 00:00:00"));
    }

    #[test]
    fn test_draw_protocol_overlay() {
        let mut app = App::new(100, 300, 1);
        app.toggle_protocol();
        let screen = render(&app);
        assert!(screen.contains("Sample Prep Reminders"));
    }
}
