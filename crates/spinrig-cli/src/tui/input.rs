//! Keyboard input handling for the control panel.
//!
//! # Key Bindings
//!
//! | Key         | Action                      |
//! |-------------|-----------------------------|
//! | `q`         | Quit                        |
//! | `↓` / `j`   | Select next control         |
//! | `↑` / `k`   | Select previous control     |
//! | `Enter`     | Activate selected control   |
//! | `u` `d` `s` | Slider up / down / stop     |
//! | `←` / `→`   | Belt left / right           |
//! | `v` / `z`   | Set speed / set step size   |
//! | `g`         | Start acquisition           |
//! | `+` / `-`   | Adjust selected value       |
//! | `t` / `T`   | Acquisition length up/down  |
//! | `r`         | Read sensor now             |
//! | `p`         | Toggle protocol reminders   |
//! | `?`         | Toggle help                 |

use crossterm::event::KeyCode;

use spinrig_core::Command;
use spinrig_types::Control;

use super::app::App;

/// User actions that can be triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    /// Activate the selected control.
    Activate,
    /// Activate a specific control.
    Press(Control),
    /// Raise the selected control's value.
    Increase,
    /// Lower the selected control's value.
    Decrease,
    MinutesUp,
    MinutesDown,
    PollSensor,
    ToggleHelp,
    ToggleProtocol,
    CloseOverlay,
    /// No action (unrecognized key).
    None,
}

/// Map a key code to an action.
///
/// While an overlay is open only the keys that close it do anything.
pub fn handle_key(key: KeyCode, overlay_open: bool) -> Action {
    if overlay_open {
        return match key {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Action::CloseOverlay,
            KeyCode::Char('?') => Action::ToggleHelp,
            KeyCode::Char('p') => Action::ToggleProtocol,
            _ => Action::None,
        };
    }

    match key {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Activate,
        KeyCode::Char('u') => Action::Press(Control::Up),
        KeyCode::Char('d') => Action::Press(Control::Down),
        KeyCode::Char('s') => Action::Press(Control::Stop),
        KeyCode::Left => Action::Press(Control::Left),
        KeyCode::Right => Action::Press(Control::Right),
        KeyCode::Char('v') => Action::Press(Control::SetSpeed),
        KeyCode::Char('z') => Action::Press(Control::SetStep),
        KeyCode::Char('g') => Action::Press(Control::StartAcquisition),
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Increase,
        KeyCode::Char('-') | KeyCode::Char('_') => Action::Decrease,
        KeyCode::Char('t') => Action::MinutesUp,
        KeyCode::Char('T') => Action::MinutesDown,
        KeyCode::Char('r') => Action::PollSensor,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('p') => Action::ToggleProtocol,
        _ => Action::None,
    }
}

/// Apply an action to the application state.
///
/// Returns the command to send to the worker, if any.
pub fn apply_action(app: &mut App, action: Action) -> Option<Command> {
    match action {
        Action::Quit => {
            app.quit();
            None
        }
        Action::SelectNext => {
            app.select_next();
            None
        }
        Action::SelectPrevious => {
            app.select_previous();
            None
        }
        Action::Activate => app.activate(app.selected_control()),
        Action::Press(control) => app.activate(control),
        Action::Increase => app.adjust(true),
        Action::Decrease => app.adjust(false),
        Action::MinutesUp => app.adjust_minutes(true),
        Action::MinutesDown => app.adjust_minutes(false),
        Action::PollSensor => {
            app.push_status_message("Reading sensor...".to_string());
            Some(Command::PollSensor)
        }
        Action::ToggleHelp => {
            app.toggle_help();
            None
        }
        Action::ToggleProtocol => {
            app.toggle_protocol();
            None
        }
        Action::CloseOverlay => {
            app.close_overlays();
            None
        }
        Action::None => None,
    }
}
