//! Application state for the control panel.
//!
//! The panel keeps the latest [`RigSnapshot`] from the worker plus the
//! operator's local inputs (speed, step, minutes) and the selected control.
//! It never changes rig state itself: activating a control yields a
//! [`Command`] for the worker.

use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use crate::config::{Config, SPEED_RANGE, STEP_RANGE};
use spinrig_core::timer::MINUTES_RANGE;
use spinrig_core::{Command, RigEvent, RigSnapshot};
use spinrig_types::{BeltCommand, Control, ControlSet, SliderCommand};

/// Controls in the order the panel lists them.
pub const PANEL: [Control; 8] = [
    Control::Up,
    Control::Down,
    Control::Stop,
    Control::Left,
    Control::Right,
    Control::SetSpeed,
    Control::SetStep,
    Control::StartAcquisition,
];

/// Speed and step change by this much per key press.
pub const VALUE_STEP: u32 = 10;

/// Maximum number of queued status messages.
const MAX_STATUS_MESSAGES: usize = 5;

/// Main application state for the control panel.
#[derive(Debug)]
pub struct App {
    should_quit: bool,
    /// Latest state published by the worker.
    pub snapshot: Option<RigSnapshot>,
    /// Index into [`PANEL`].
    pub selected: usize,
    /// Value sent with Set Speed.
    pub speed: u32,
    /// Value sent with Set Step Size.
    pub step: u32,
    /// Acquisition length shown next to Start Acquisition.
    pub minutes: u32,
    pub show_help: bool,
    pub show_protocol: bool,
    status_messages: Vec<(String, Instant)>,
    status_message_timeout: Duration,
}

impl App {
    pub fn new(speed: u32, step: u32, minutes: u32) -> Self {
        Self {
            should_quit: false,
            snapshot: None,
            selected: 0,
            speed,
            step,
            minutes,
            show_help: false,
            show_protocol: false,
            status_messages: Vec::new(),
            status_message_timeout: Duration::from_secs(5),
        }
    }

    /// Start from the configured speed, step and preset.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.default_speed(),
            config.default_step(),
            config.timer.initial_minutes,
        )
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Enabled flags from the latest snapshot; everything is enabled
    /// before the first one arrives.
    pub fn controls(&self) -> ControlSet {
        self.snapshot
            .as_ref()
            .map(|s| s.controls)
            .unwrap_or_default()
    }

    pub fn is_acquiring(&self) -> bool {
        self.snapshot.as_ref().is_some_and(RigSnapshot::is_acquiring)
    }

    pub fn selected_control(&self) -> Control {
        PANEL[self.selected % PANEL.len()]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % PANEL.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + PANEL.len() - 1) % PANEL.len();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        self.show_protocol = false;
    }

    pub fn toggle_protocol(&mut self) {
        self.show_protocol = !self.show_protocol;
        self.show_help = false;
    }

    pub fn has_overlay(&self) -> bool {
        self.show_help || self.show_protocol
    }

    pub fn close_overlays(&mut self) {
        self.show_help = false;
        self.show_protocol = false;
    }

    /// The command a control sends with the current inputs.
    pub fn command_for(&self, control: Control) -> Command {
        let send = Command::Send;
        match control {
            Control::Up => send(SliderCommand::Up.into()),
            Control::Down => send(SliderCommand::Down.into()),
            Control::Stop => send(SliderCommand::Stop.into()),
            Control::Left => send(BeltCommand::Left.into()),
            Control::Right => send(BeltCommand::Right.into()),
            Control::SetSpeed => send(BeltCommand::SetSpeed(self.speed).into()),
            Control::SetStep => send(BeltCommand::SetStep(self.step).into()),
            Control::StartAcquisition => Command::StartAcquisition,
        }
    }

    /// Activate a control, refusing locally when it is disabled.
    pub fn activate(&mut self, control: Control) -> Option<Command> {
        if !self.controls().is_enabled(control) {
            self.push_status_message(format!("{} is disabled", control.label()));
            return None;
        }
        Some(self.command_for(control))
    }

    /// Nudge the value belonging to the selected control.
    ///
    /// Speed and step move by [`VALUE_STEP`]; the acquisition length moves
    /// by one minute and is sent to the worker.
    pub fn adjust(&mut self, up: bool) -> Option<Command> {
        match self.selected_control() {
            Control::SetSpeed => {
                self.speed = nudge(self.speed, VALUE_STEP, up, &SPEED_RANGE);
                None
            }
            Control::SetStep => {
                self.step = nudge(self.step, VALUE_STEP, up, &STEP_RANGE);
                None
            }
            Control::StartAcquisition => self.adjust_minutes(up),
            control => {
                self.push_status_message(format!("{} has no value to adjust", control.label()));
                None
            }
        }
    }

    /// Change the acquisition length by one minute.
    pub fn adjust_minutes(&mut self, up: bool) -> Option<Command> {
        if self.is_acquiring() {
            self.push_status_message("Timer is running".to_string());
            return None;
        }
        let minutes = nudge(self.minutes, 1, up, &MINUTES_RANGE);
        if minutes == self.minutes {
            return None;
        }
        self.minutes = minutes;
        Some(Command::SetTimerMinutes(minutes))
    }

    pub fn push_status_message(&mut self, message: String) {
        self.status_messages.push((message, Instant::now()));
        while self.status_messages.len() > MAX_STATUS_MESSAGES {
            self.status_messages.remove(0);
        }
    }

    pub fn clean_expired_messages(&mut self) {
        let timeout = self.status_message_timeout;
        self.status_messages
            .retain(|(_, created)| created.elapsed() < timeout);
    }

    pub fn current_status_message(&self) -> Option<&str> {
        self.status_messages.last().map(|(msg, _)| msg.as_str())
    }

    /// Fold one worker event into the panel state.
    pub fn handle_rig_event(&mut self, event: RigEvent) {
        match event {
            RigEvent::Snapshot(snapshot) => {
                // The worker resets the preset on expiry; follow it while idle.
                if !snapshot.is_acquiring() {
                    self.minutes = snapshot.timer.display().minutes;
                }
                self.snapshot = Some(*snapshot);
            }
            RigEvent::CommandCompleted { command, outcome } => {
                self.push_status_message(format!("{}: {}", command, outcome));
            }
            RigEvent::CommandFailed { command, error } => {
                self.push_status_message(format!("{} failed: {}", command, error));
            }
            RigEvent::SensorFailed {
                error,
                consecutive_failures,
            } => {
                self.push_status_message(format!(
                    "Sensor read failed ({}x): {}",
                    consecutive_failures, error
                ));
            }
            RigEvent::AcquisitionStarted { minutes } => {
                self.push_status_message(format!("Acquisition started for {} min", minutes));
            }
            RigEvent::AcquisitionFinished => {
                self.push_status_message("Acquisition finished".to_string());
            }
            RigEvent::Rejected(rejection) => {
                self.push_status_message(rejection.to_string());
            }
        }
    }
}

fn nudge(value: u32, by: u32, up: bool, range: &RangeInclusive<u32>) -> u32 {
    let moved = if up {
        value.saturating_add(by)
    } else {
        value.saturating_sub(by)
    };
    moved.clamp(*range.start(), *range.end())
}
