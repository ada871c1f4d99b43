//! Core types for rig commands, readings and control state.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Substring the sensor relay prints when the DHT sensor could not be read.
pub const SENSOR_READ_FAILED_MARKER: &str = "Failed to get reading. Try again!";

/// Delimiter between the temperature and humidity fields of sensor output.
pub const SENSOR_FIELD_DELIMITER: &str = "  ";

/// An actuator reachable through its own relay process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Actuator {
    /// Linear slider pushing the syringe pump.
    Slider,
    /// Stepper-motor belt.
    Belt,
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actuator::Slider => write!(f, "slider"),
            Actuator::Belt => write!(f, "belt"),
        }
    }
}

/// Commands understood by the slider (syringe pump) firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "command", content = "value", rename_all = "snake_case"))]
pub enum SliderCommand {
    /// Raise the slider.
    Up,
    /// Lower the slider.
    Down,
    /// Halt the slider.
    Stop,
    /// Run for the given number of minutes.
    StartTimer(u32),
}

impl SliderCommand {
    /// Single-character code written on the last line of the mailbox.
    pub fn code(&self) -> char {
        match self {
            SliderCommand::Up => 'u',
            SliderCommand::Down => 'd',
            SliderCommand::Stop => 's',
            SliderCommand::StartTimer(_) => 't',
        }
    }

    /// Numeric argument, 0 when the command takes none.
    pub fn value(&self) -> u32 {
        match self {
            SliderCommand::StartTimer(minutes) => *minutes,
            _ => 0,
        }
    }
}

/// Commands understood by the stepper-motor belt firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "command", content = "value", rename_all = "snake_case"))]
pub enum BeltCommand {
    /// Set the stepper speed.
    SetSpeed(u32),
    /// Set the step size.
    SetStep(u32),
    /// Move the belt left.
    Left,
    /// Move the belt right.
    Right,
    /// Run for the given number of minutes.
    StartTimer(u32),
}

impl BeltCommand {
    /// Single-character code written on the last line of the mailbox.
    pub fn code(&self) -> char {
        match self {
            BeltCommand::SetSpeed(_) => 'v',
            BeltCommand::SetStep(_) => 'z',
            BeltCommand::Left => 'l',
            BeltCommand::Right => 'r',
            BeltCommand::StartTimer(_) => 't',
        }
    }

    /// Numeric argument, 0 when the command takes none.
    pub fn value(&self) -> u32 {
        match self {
            BeltCommand::SetSpeed(v) | BeltCommand::SetStep(v) | BeltCommand::StartTimer(v) => *v,
            BeltCommand::Left | BeltCommand::Right => 0,
        }
    }
}

/// A command addressed to one of the rig's actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "actuator", content = "command", rename_all = "snake_case"))]
pub enum RigCommand {
    Slider(SliderCommand),
    Belt(BeltCommand),
}

impl RigCommand {
    /// The actuator whose relay carries this command.
    pub fn actuator(&self) -> Actuator {
        match self {
            RigCommand::Slider(_) => Actuator::Slider,
            RigCommand::Belt(_) => Actuator::Belt,
        }
    }

    /// Single-character command code.
    pub fn code(&self) -> char {
        match self {
            RigCommand::Slider(cmd) => cmd.code(),
            RigCommand::Belt(cmd) => cmd.code(),
        }
    }

    /// Numeric argument, 0 when not applicable.
    pub fn value(&self) -> u32 {
        match self {
            RigCommand::Slider(cmd) => cmd.value(),
            RigCommand::Belt(cmd) => cmd.value(),
        }
    }

    /// The operator control that issues this command.
    pub fn control(&self) -> Control {
        match self {
            RigCommand::Slider(SliderCommand::Up) => Control::Up,
            RigCommand::Slider(SliderCommand::Down) => Control::Down,
            RigCommand::Slider(SliderCommand::Stop) => Control::Stop,
            RigCommand::Belt(BeltCommand::SetSpeed(_)) => Control::SetSpeed,
            RigCommand::Belt(BeltCommand::SetStep(_)) => Control::SetStep,
            RigCommand::Belt(BeltCommand::Left) => Control::Left,
            RigCommand::Belt(BeltCommand::Right) => Control::Right,
            RigCommand::Slider(SliderCommand::StartTimer(_))
            | RigCommand::Belt(BeltCommand::StartTimer(_)) => Control::StartAcquisition,
        }
    }
}

impl From<SliderCommand> for RigCommand {
    fn from(cmd: SliderCommand) -> Self {
        RigCommand::Slider(cmd)
    }
}

impl From<BeltCommand> for RigCommand {
    fn from(cmd: BeltCommand) -> Self {
        RigCommand::Belt(cmd)
    }
}

impl fmt::Display for RigCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RigCommand::Slider(SliderCommand::Up) => write!(f, "slider up"),
            RigCommand::Slider(SliderCommand::Down) => write!(f, "slider down"),
            RigCommand::Slider(SliderCommand::Stop) => write!(f, "slider stop"),
            RigCommand::Slider(SliderCommand::StartTimer(m)) => write!(f, "slider timer {}m", m),
            RigCommand::Belt(BeltCommand::SetSpeed(v)) => write!(f, "belt speed {}", v),
            RigCommand::Belt(BeltCommand::SetStep(v)) => write!(f, "belt step {}", v),
            RigCommand::Belt(BeltCommand::Left) => write!(f, "belt left"),
            RigCommand::Belt(BeltCommand::Right) => write!(f, "belt right"),
            RigCommand::Belt(BeltCommand::StartTimer(m)) => write!(f, "belt timer {}m", m),
        }
    }
}

/// Last known reachability of a relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectionState {
    #[default]
    Enabled,
    Disabled,
}

impl ConnectionState {
    /// Whether the relay last reported success.
    pub fn is_enabled(self) -> bool {
        matches!(self, ConnectionState::Enabled)
    }
}

impl From<bool> for ConnectionState {
    fn from(enabled: bool) -> Self {
        if enabled {
            ConnectionState::Enabled
        } else {
            ConnectionState::Disabled
        }
    }
}

/// Classified result of one relay invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RelayOutcome {
    /// The relay passed the message to the controller.
    Success,
    /// The relay could not find the Bluetooth module.
    DeviceNotFound,
    /// The relay script or its library is missing (no output).
    LibraryMissing,
    /// Output did not match any known message, or the relay never ran.
    Unrecognized,
}

impl RelayOutcome {
    /// Connection state implied by this outcome.
    pub fn connection_state(self) -> ConnectionState {
        ConnectionState::from(matches!(self, RelayOutcome::Success))
    }
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayOutcome::Success => write!(f, "message passed"),
            RelayOutcome::DeviceNotFound => write!(f, "Bluetooth device not found"),
            RelayOutcome::LibraryMissing => write!(f, "relay script or library missing"),
            RelayOutcome::Unrecognized => write!(f, "unrecognized relay output"),
        }
    }
}

/// The single connection label shown to the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LinkStatus {
    #[default]
    Enabled,
    /// The slider (syringe pump) relay is unreachable.
    PumpDisabled,
    /// The stepper-motor belt relay is unreachable.
    BeltDisabled,
}

impl LinkStatus {
    /// Label after a command on `actuator` left its relay in `state`.
    pub fn after(actuator: Actuator, state: ConnectionState) -> Self {
        match (state, actuator) {
            (ConnectionState::Enabled, _) => LinkStatus::Enabled,
            (ConnectionState::Disabled, Actuator::Slider) => LinkStatus::PumpDisabled,
            (ConnectionState::Disabled, Actuator::Belt) => LinkStatus::BeltDisabled,
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, LinkStatus::Enabled)
    }

    /// Label text.
    pub fn label(self) -> &'static str {
        match self {
            LinkStatus::Enabled => "Bluetooth Enabled",
            LinkStatus::PumpDisabled => "Bluetooth Pump Disabled",
            LinkStatus::BeltDisabled => "Bluetooth S.M. Disabled",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A temperature/humidity pair from the DHT sensor relay.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    /// Temperature as reported by the relay (degrees Fahrenheit on the rig).
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl SensorReading {
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    /// Parse the sensor relay's standard output.
    ///
    /// The relay prints `"<temperature>  <humidity>"` (two spaces). Empty
    /// output means the helper is missing; output containing
    /// [`SENSOR_READ_FAILED_MARKER`] means the sensor did not answer.
    ///
    /// # Examples
    ///
    /// ```
    /// use spinrig_types::SensorReading;
    ///
    /// let reading = SensorReading::from_relay_output("72.0  45.5\n").unwrap();
    /// assert_eq!(reading.temperature, 72.0);
    /// assert_eq!(reading.humidity, 45.5);
    /// ```
    pub fn from_relay_output(output: &str) -> ParseResult<Self> {
        let output = output.trim();
        if output.is_empty() {
            return Err(ParseError::EmptyOutput);
        }
        if output.contains(SENSOR_READ_FAILED_MARKER) {
            return Err(ParseError::ReadFailed);
        }

        let mut fields = output.split(SENSOR_FIELD_DELIMITER);
        let temperature = parse_field(fields.next(), "temperature")?;
        let humidity = parse_field(fields.next(), "humidity")?;

        Ok(Self {
            temperature,
            humidity,
        })
    }
}

fn parse_field(field: Option<&str>, name: &'static str) -> ParseResult<f64> {
    let raw = field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingField(name))?;
    raw.parse::<f64>()
        .map_err(|_| ParseError::invalid_number(name, raw))
}

/// Operator controls on the panel that can be enabled or disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Control {
    StartAcquisition = 0,
    Left = 1,
    Right = 2,
    SetSpeed = 3,
    SetStep = 4,
    Up = 5,
    Down = 6,
    Stop = 7,
}

impl Control {
    /// Every control, in panel order.
    pub const ALL: [Control; 8] = [
        Control::StartAcquisition,
        Control::Left,
        Control::Right,
        Control::SetSpeed,
        Control::SetStep,
        Control::Up,
        Control::Down,
        Control::Stop,
    ];

    /// Actuator controls that an acquisition locks and its expiry releases.
    pub const ACTUATORS: [Control; 7] = [
        Control::Left,
        Control::Right,
        Control::SetSpeed,
        Control::SetStep,
        Control::Up,
        Control::Down,
        Control::Stop,
    ];

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            Control::StartAcquisition => "Start Acquisition",
            Control::Left => "Left",
            Control::Right => "Right",
            Control::SetSpeed => "Set Speed",
            Control::SetStep => "Set Step Size",
            Control::Up => "Up",
            Control::Down => "Down",
            Control::Stop => "Stop",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Enabled flags for every [`Control`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlSet {
    bits: u8,
}

impl ControlSet {
    /// All controls enabled.
    pub fn all_enabled() -> Self {
        Self { bits: u8::MAX }
    }

    /// All controls disabled.
    pub fn all_disabled() -> Self {
        Self { bits: 0 }
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        self.bits & control.bit() != 0
    }

    pub fn set(&mut self, control: Control, enabled: bool) {
        if enabled {
            self.bits |= control.bit();
        } else {
            self.bits &= !control.bit();
        }
    }

    /// Enable every control in `controls`.
    pub fn enable(&mut self, controls: &[Control]) {
        for control in controls {
            self.set(*control, true);
        }
    }

    /// Disable every control in `controls`.
    pub fn disable(&mut self, controls: &[Control]) {
        for control in controls {
            self.set(*control, false);
        }
    }

    /// Iterate over the enabled controls.
    pub fn enabled(&self) -> impl Iterator<Item = Control> + '_ {
        Control::ALL
            .into_iter()
            .filter(move |control| self.is_enabled(*control))
    }
}

impl Default for ControlSet {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl fmt::Debug for ControlSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.enabled()).finish()
    }
}
