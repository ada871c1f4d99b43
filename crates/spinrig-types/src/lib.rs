//! Platform-agnostic types for the spinrig electrospinning control panel.
//!
//! This crate provides the shared vocabulary used by the relay plumbing in
//! `spinrig-core` and the operator surfaces in `spinrig-cli`.
//!
//! # Features
//!
//! - Command enumerations for the slider (syringe pump) and the stepper belt
//! - Relay outcomes and connection states
//! - Temperature/humidity readings and their text parser
//! - Operator controls and their enabled flags
//!
//! # Example
//!
//! ```
//! use spinrig_types::{RigCommand, BeltCommand, Actuator};
//!
//! let cmd = RigCommand::from(BeltCommand::SetSpeed(120));
//! assert_eq!(cmd.actuator(), Actuator::Belt);
//! assert_eq!(cmd.code(), 'v');
//! assert_eq!(cmd.value(), 120);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    Actuator, BeltCommand, ConnectionState, Control, ControlSet, LinkStatus, RelayOutcome,
    RigCommand, SENSOR_READ_FAILED_MARKER, SensorReading, SliderCommand,
};

#[cfg(test)]
mod tests {
    use super::*;

    // --- Command code tests ---

    #[test]
    fn test_slider_codes() {
        assert_eq!(SliderCommand::Up.code(), 'u');
        assert_eq!(SliderCommand::Down.code(), 'd');
        assert_eq!(SliderCommand::Stop.code(), 's');
        assert_eq!(SliderCommand::StartTimer(5).code(), 't');
    }

    #[test]
    fn test_belt_codes() {
        assert_eq!(BeltCommand::SetSpeed(1).code(), 'v');
        assert_eq!(BeltCommand::SetStep(1).code(), 'z');
        assert_eq!(BeltCommand::Left.code(), 'l');
        assert_eq!(BeltCommand::Right.code(), 'r');
        assert_eq!(BeltCommand::StartTimer(1).code(), 't');
    }

    #[test]
    fn test_command_values_default_to_zero() {
        assert_eq!(SliderCommand::Up.value(), 0);
        assert_eq!(SliderCommand::Stop.value(), 0);
        assert_eq!(BeltCommand::Left.value(), 0);
        assert_eq!(SliderCommand::StartTimer(20).value(), 20);
        assert_eq!(BeltCommand::SetStep(300).value(), 300);
    }

    #[test]
    fn test_rig_command_actuator() {
        assert_eq!(RigCommand::from(SliderCommand::Up).actuator(), Actuator::Slider);
        assert_eq!(RigCommand::from(BeltCommand::Right).actuator(), Actuator::Belt);
    }

    #[test]
    fn test_rig_command_control_mapping() {
        assert_eq!(RigCommand::from(SliderCommand::Down).control(), Control::Down);
        assert_eq!(
            RigCommand::from(BeltCommand::SetSpeed(10)).control(),
            Control::SetSpeed
        );
        assert_eq!(
            RigCommand::from(SliderCommand::StartTimer(3)).control(),
            Control::StartAcquisition
        );
        assert_eq!(
            RigCommand::from(BeltCommand::StartTimer(3)).control(),
            Control::StartAcquisition
        );
    }

    #[test]
    fn test_rig_command_display() {
        assert_eq!(RigCommand::from(SliderCommand::Up).to_string(), "slider up");
        assert_eq!(
            RigCommand::from(BeltCommand::SetStep(300)).to_string(),
            "belt step 300"
        );
    }

    // --- Relay outcome tests ---

    #[test]
    fn test_only_success_enables_connection() {
        assert_eq!(
            RelayOutcome::Success.connection_state(),
            ConnectionState::Enabled
        );
        assert_eq!(
            RelayOutcome::DeviceNotFound.connection_state(),
            ConnectionState::Disabled
        );
        assert_eq!(
            RelayOutcome::LibraryMissing.connection_state(),
            ConnectionState::Disabled
        );
        assert_eq!(
            RelayOutcome::Unrecognized.connection_state(),
            ConnectionState::Disabled
        );
    }

    #[test]
    fn test_link_status_labels() {
        assert_eq!(
            LinkStatus::after(Actuator::Slider, ConnectionState::Enabled),
            LinkStatus::Enabled
        );
        assert_eq!(
            LinkStatus::after(Actuator::Slider, ConnectionState::Disabled).label(),
            "Bluetooth Pump Disabled"
        );
        assert_eq!(
            LinkStatus::after(Actuator::Belt, ConnectionState::Disabled).label(),
            "Bluetooth S.M. Disabled"
        );
        assert_eq!(LinkStatus::default().to_string(), "Bluetooth Enabled");
    }

    // --- Sensor parsing tests ---

    #[test]
    fn test_parse_sensor_output() {
        let reading = SensorReading::from_relay_output("72.0  45.5\n").unwrap();
        assert!((reading.temperature - 72.0).abs() < f64::EPSILON);
        assert!((reading.humidity - 45.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_sensor_output_extra_padding() {
        let reading = SensorReading::from_relay_output("  68.4   51.0  \n").unwrap();
        assert!((reading.temperature - 68.4).abs() < 1e-9);
        assert!((reading.humidity - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_sensor_output_empty() {
        assert_eq!(
            SensorReading::from_relay_output(""),
            Err(ParseError::EmptyOutput)
        );
        assert_eq!(
            SensorReading::from_relay_output("  \n\n"),
            Err(ParseError::EmptyOutput)
        );
    }

    #[test]
    fn test_parse_sensor_output_failure_marker() {
        let output = "Python: Failed to get reading. Try again!\n";
        assert_eq!(
            SensorReading::from_relay_output(output),
            Err(ParseError::ReadFailed)
        );
    }

    #[test]
    fn test_parse_sensor_output_single_space_is_missing_humidity() {
        assert_eq!(
            SensorReading::from_relay_output("72.0 45.5"),
            Err(ParseError::invalid_number("temperature", "72.0 45.5"))
        );
        assert_eq!(
            SensorReading::from_relay_output("72.0"),
            Err(ParseError::MissingField("humidity"))
        );
    }

    #[test]
    fn test_parse_sensor_output_not_numeric() {
        let err = SensorReading::from_relay_output("hot  humid").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber {
                field: "temperature",
                ..
            }
        ));
        assert!(err.to_string().contains("hot"));
    }

    // --- ControlSet tests ---

    #[test]
    fn test_control_set_defaults_to_all_enabled() {
        let set = ControlSet::default();
        assert!(Control::ALL.iter().all(|c| set.is_enabled(*c)));
        assert_eq!(set.enabled().count(), 8);
    }

    #[test]
    fn test_control_set_disable_and_enable() {
        let mut set = ControlSet::all_enabled();
        set.disable(&Control::ALL);
        assert_eq!(set, ControlSet::all_disabled());

        set.enable(&Control::ACTUATORS);
        assert!(!set.is_enabled(Control::StartAcquisition));
        assert!(set.is_enabled(Control::Left));
        assert!(set.is_enabled(Control::Stop));
        assert_eq!(set.enabled().count(), 7);
    }

    #[test]
    fn test_control_set_debug_lists_enabled() {
        let mut set = ControlSet::all_disabled();
        set.set(Control::Up, true);
        assert_eq!(format!("{:?}", set), "{Up}");
    }

    // --- Serialization tests ---

    #[test]
    fn test_rig_command_serialization() {
        let json = serde_json::to_string(&RigCommand::from(BeltCommand::SetSpeed(120))).unwrap();
        assert!(json.contains("\"actuator\":\"belt\""));
        assert!(json.contains("\"set_speed\""));
        assert!(json.contains("120"));
    }

    #[test]
    fn test_sensor_reading_serialization() {
        let reading = SensorReading::new(72.0, 45.5);
        let json = serde_json::to_string(&reading).unwrap();
        assert_eq!(json, r#"{"temperature":72.0,"humidity":45.5}"#);
    }

    #[test]
    fn test_connection_state_serialization() {
        assert_eq!(
            serde_json::to_string(&ConnectionState::Disabled).unwrap(),
            "\"disabled\""
        );
    }
}
