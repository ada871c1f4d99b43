//! Rig state owned by the worker.
//!
//! [`RigState`] holds the timer, the control flags, both connection states
//! and the last reading. It is plain synchronous data; the
//! [`RigWorker`](crate::RigWorker) feeds it events and publishes its
//! snapshots.

use thiserror::Error;
use time::OffsetDateTime;

use spinrig_types::{
    Actuator, BeltCommand, ConnectionState, Control, ControlSet, LinkStatus, RigCommand,
    SensorReading, SliderCommand,
};

use crate::messages::RigSnapshot;
use crate::thresholds::HumidityBand;
use crate::timer::{StartOutcome, Tick, Timer, TimerError};

/// Why the worker refused a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{} is disabled", .0.label())]
    ControlDisabled(Control),
    #[error("Acquisition already running")]
    AlreadyRunning,
    #[error("{0}")]
    Timer(#[from] TimerError),
    #[error("Relay queue is full, command dropped")]
    Busy,
}

/// Mutable rig state.
#[derive(Debug, Clone)]
pub struct RigState {
    timer: Timer,
    controls: ControlSet,
    slider: ConnectionState,
    belt: ConnectionState,
    link: LinkStatus,
    reading: SensorReading,
    reading_updated: Option<OffsetDateTime>,
    band: HumidityBand,
}

impl RigState {
    /// All controls enabled, both relays enabled, reading `0.0, 0.0`.
    ///
    /// The humidity gate is applied immediately, so with gating on Start
    /// Acquisition begins disabled.
    pub fn new(timer: Timer, band: HumidityBand) -> Self {
        let mut state = Self {
            timer,
            controls: ControlSet::all_enabled(),
            slider: ConnectionState::Enabled,
            belt: ConnectionState::Enabled,
            link: LinkStatus::Enabled,
            reading: SensorReading::default(),
            reading_updated: None,
            band,
        };
        state.apply_humidity_gate();
        state
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn controls(&self) -> ControlSet {
        self.controls
    }

    pub fn link(&self) -> LinkStatus {
        self.link
    }

    pub fn reading(&self) -> SensorReading {
        self.reading
    }

    pub fn connection(&self, actuator: Actuator) -> ConnectionState {
        match actuator {
            Actuator::Slider => self.slider,
            Actuator::Belt => self.belt,
        }
    }

    pub fn humidity_in_band(&self) -> bool {
        self.band.admits(&self.reading)
    }

    /// Check that the control issuing `command` is enabled.
    pub fn check_command(&self, command: &RigCommand) -> Result<(), Rejection> {
        let control = command.control();
        if self.controls.is_enabled(control) {
            Ok(())
        } else {
            Err(Rejection::ControlDisabled(control))
        }
    }

    pub fn set_timer_minutes(&mut self, minutes: u32) -> Result<(), Rejection> {
        self.timer.set_minutes(minutes)?;
        Ok(())
    }

    /// Start the countdown and lock every control.
    ///
    /// Returns the two timed commands to send, slider first.
    pub fn start_acquisition(&mut self) -> Result<[RigCommand; 2], Rejection> {
        if !self.controls.is_enabled(Control::StartAcquisition) {
            return Err(Rejection::ControlDisabled(Control::StartAcquisition));
        }
        match self.timer.start() {
            StartOutcome::AlreadyRunning => Err(Rejection::AlreadyRunning),
            StartOutcome::Started(preset) => {
                self.controls.disable(&Control::ALL);
                let minutes = preset.minutes;
                Ok([
                    SliderCommand::StartTimer(minutes).into(),
                    BeltCommand::StartTimer(minutes).into(),
                ])
            }
        }
    }

    /// Advance the countdown one second.
    ///
    /// On expiry the actuator controls are released; Start Acquisition waits
    /// for the next humidity check.
    pub fn tick_timer(&mut self) -> Tick {
        let tick = self.timer.tick();
        if tick == Tick::Expired {
            self.controls.enable(&Control::ACTUATORS);
        }
        tick
    }

    /// Record the connection state a relay run left behind.
    pub fn apply_connection(&mut self, actuator: Actuator, state: ConnectionState) {
        match actuator {
            Actuator::Slider => self.slider = state,
            Actuator::Belt => self.belt = state,
        }
        self.link = LinkStatus::after(actuator, state);
    }

    /// Record a fresh reading, then re-evaluate the humidity gate.
    pub fn apply_reading(&mut self, reading: SensorReading, updated: Option<OffsetDateTime>) {
        self.reading = reading;
        if updated.is_some() {
            self.reading_updated = updated;
        }
        self.apply_humidity_gate();
    }

    /// Gate Start Acquisition on the last known humidity.
    pub fn apply_humidity_gate(&mut self) {
        if !self.humidity_in_band() {
            self.controls.set(Control::StartAcquisition, false);
        } else if !self.timer.is_running() {
            self.controls.set(Control::StartAcquisition, true);
        }
    }

    pub fn snapshot(&self, clock: OffsetDateTime) -> RigSnapshot {
        RigSnapshot {
            clock,
            timer: self.timer.state(),
            reading: self.reading,
            reading_updated: self.reading_updated,
            humidity_in_band: self.humidity_in_band(),
            slider: self.slider,
            belt: self.belt,
            link: self.link,
            controls: self.controls,
        }
    }
}

impl Default for RigState {
    fn default() -> Self {
        Self::new(Timer::default(), HumidityBand::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{Countdown, TimerState};

    fn in_band_state() -> RigState {
        let mut state = RigState::default();
        state.apply_reading(SensorReading::new(72.0, 50.0), None);
        state
    }

    #[test]
    fn test_start_gated_until_humidity_in_band() {
        let mut state = RigState::default();
        assert!(!state.controls().is_enabled(Control::StartAcquisition));
        assert_eq!(
            state.start_acquisition(),
            Err(Rejection::ControlDisabled(Control::StartAcquisition))
        );

        state.apply_reading(SensorReading::new(72.0, 45.0), None);
        assert!(state.controls().is_enabled(Control::StartAcquisition));
    }

    #[test]
    fn test_gate_off_enables_start() {
        let band = HumidityBand {
            gate: false,
            ..Default::default()
        };
        let state = RigState::new(Timer::default(), band);
        assert!(state.controls().is_enabled(Control::StartAcquisition));
    }

    #[test]
    fn test_start_acquisition_locks_everything() {
        let mut state = in_band_state();
        state.set_timer_minutes(20).unwrap();

        let commands = state.start_acquisition().unwrap();
        assert_eq!(
            commands,
            [
                RigCommand::Slider(SliderCommand::StartTimer(20)),
                RigCommand::Belt(BeltCommand::StartTimer(20)),
            ]
        );
        assert_eq!(state.controls(), ControlSet::all_disabled());
        assert!(state.timer().is_running());
    }

    #[test]
    fn test_in_band_reading_does_not_unlock_start_while_running() {
        let mut state = in_band_state();
        state.start_acquisition().unwrap();

        state.apply_reading(SensorReading::new(72.0, 50.0), None);
        assert!(!state.controls().is_enabled(Control::StartAcquisition));
    }

    #[test]
    fn test_expiry_releases_actuators_once() {
        let mut state = in_band_state();
        state.start_acquisition().unwrap();

        let mut expiries = 0;
        for _ in 0..120 {
            if state.tick_timer() == Tick::Expired {
                expiries += 1;
            }
        }
        assert_eq!(expiries, 1);
        assert_eq!(
            state.timer().state(),
            TimerState::Idle {
                preset: Countdown::from_minutes(20)
            }
        );
        assert!(Control::ACTUATORS
            .iter()
            .all(|c| state.controls().is_enabled(*c)));
        assert!(!state.controls().is_enabled(Control::StartAcquisition));

        state.apply_humidity_gate();
        assert!(state.controls().is_enabled(Control::StartAcquisition));
    }

    #[test]
    fn test_disabled_control_rejects_command() {
        let mut state = in_band_state();
        state.start_acquisition().unwrap();
        assert_eq!(
            state.check_command(&SliderCommand::Up.into()),
            Err(Rejection::ControlDisabled(Control::Up))
        );
    }

    #[test]
    fn test_set_minutes_rejected_while_running() {
        let mut state = in_band_state();
        state.start_acquisition().unwrap();
        assert_eq!(
            state.set_timer_minutes(5),
            Err(Rejection::Timer(TimerError::Running))
        );
    }

    #[test]
    fn test_link_label_follows_last_command() {
        let mut state = RigState::default();
        state.apply_connection(Actuator::Belt, ConnectionState::Disabled);
        assert_eq!(state.link(), LinkStatus::BeltDisabled);

        state.apply_connection(Actuator::Slider, ConnectionState::Disabled);
        assert_eq!(state.link(), LinkStatus::PumpDisabled);

        state.apply_connection(Actuator::Belt, ConnectionState::Enabled);
        assert_eq!(state.link(), LinkStatus::Enabled);
        assert_eq!(state.connection(Actuator::Slider), ConnectionState::Disabled);
    }

    #[test]
    fn test_out_of_band_disables_start_again() {
        let mut state = in_band_state();
        state.apply_reading(SensorReading::new(72.0, 60.0), None);
        assert!(!state.controls().is_enabled(Control::StartAcquisition));
        assert!(!state.humidity_in_band());
    }
}
