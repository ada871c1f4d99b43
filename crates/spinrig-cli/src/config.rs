//! Configuration file management.
//!
//! Every field has a default, so a missing file or a partial one yields the
//! rig's stock paths and literals.
//!
//! ```toml
//! [slider]
//! mailbox = "/home/pi/temp/bluetooth.txt"
//! relay = "sudo python /home/pi/temp/bluetoothHC06.py"
//! timeout_secs = 30
//!
//! [humidity]
//! min = 45.0
//! max = 55.0
//! gate = true
//!
//! [belt.codes]
//! speed = "v"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use spinrig_core::{
    BeltCodes, CommandChannel, DynRelay, HumidityBand, Mailbox, ProcessRelay, RelayCommand, RelayMessages,
    Rig, SensorPoller, WorkerOptions,
};
use spinrig_types::Actuator;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "SPINRIG_CONFIG";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    /// Slider (syringe pump) relay
    #[serde(default = "ActuatorConfig::slider")]
    pub slider: ActuatorConfig,

    /// Stepper-motor belt relay
    #[serde(default = "ActuatorConfig::belt")]
    pub belt: ActuatorConfig,

    #[serde(default)]
    pub sensor: SensorConfig,

    /// Lines the relay scripts print
    #[serde(default)]
    pub messages: RelayMessages,

    /// Humidity band gating Start Acquisition
    #[serde(default)]
    pub humidity: HumidityBand,

    #[serde(default)]
    pub timer: TimerConfig,

    /// Default control values in the dashboard
    #[serde(default)]
    pub controls: ControlsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_color: false,
            slider: ActuatorConfig::slider(),
            belt: ActuatorConfig::belt(),
            sensor: SensorConfig::default(),
            messages: RelayMessages::default(),
            humidity: HumidityBand::default(),
            timer: TimerConfig::default(),
            controls: ControlsConfig::default(),
        }
    }
}

/// One actuator's mailbox and relay.
///
/// Both fields are required when the section is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// File the pending command is written to
    pub mailbox: PathBuf,

    /// Relay command line, split on whitespace
    pub relay: String,

    /// Seconds before a hung relay is killed (0 waits forever)
    #[serde(default = "default_relay_timeout")]
    pub timeout_secs: u64,

    /// Mailbox codes for belt commands; the slider ignores this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<BeltCodes>,
}

impl ActuatorConfig {
    pub fn slider() -> Self {
        Self {
            mailbox: PathBuf::from("/home/pi/temp/bluetooth.txt"),
            relay: "sudo python /home/pi/temp/bluetoothHC06.py".to_string(),
            timeout_secs: default_relay_timeout(),
            codes: None,
        }
    }

    pub fn belt() -> Self {
        Self {
            mailbox: PathBuf::from("/home/pi/temp/bluetoothSM.txt"),
            relay: "sudo python /home/pi/temp/bluetoothSM.py".to_string(),
            timeout_secs: default_relay_timeout(),
            codes: None,
        }
    }
}

/// Sensor relay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(default = "default_sensor_relay")]
    pub relay: String,

    #[serde(default = "default_relay_timeout")]
    pub timeout_secs: u64,

    /// Seconds between polls
    #[serde(default = "default_sensor_interval")]
    pub interval_secs: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            relay: default_sensor_relay(),
            timeout_secs: default_relay_timeout(),
            interval_secs: default_sensor_interval(),
        }
    }
}

/// Acquisition countdown presets in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_initial_minutes")]
    pub initial_minutes: u32,

    #[serde(default = "default_reset_minutes")]
    pub reset_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            initial_minutes: default_initial_minutes(),
            reset_minutes: default_reset_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsConfig {
    #[serde(default = "default_speed")]
    pub speed: u32,

    #[serde(default = "default_step")]
    pub step: u32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            step: default_step(),
        }
    }
}

/// Accepted belt speed values.
pub const SPEED_RANGE: std::ops::RangeInclusive<u32> = 10..=1001;
/// Accepted belt step values.
pub const STEP_RANGE: std::ops::RangeInclusive<u32> = 10..=2050;

fn default_relay_timeout() -> u64 {
    30
}

fn default_sensor_relay() -> String {
    "sudo python /home/pi/Adafruit_Python_DHT/examples/DHT11_read.py".to_string()
}

fn default_sensor_interval() -> u64 {
    2
}

fn default_initial_minutes() -> u32 {
    spinrig_core::timer::DEFAULT_INITIAL_MINUTES
}

fn default_reset_minutes() -> u32 {
    spinrig_core::timer::DEFAULT_RESET_MINUTES
}

fn default_speed() -> u32 {
    100
}

fn default_step() -> u32 {
    300
}

fn timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl Config {
    /// Get the default config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spinrig")
            .join("config.toml")
    }

    /// The explicit path if given, else the default path.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit.map(Path::to_path_buf).unwrap_or_else(Self::path)
    }

    /// Load config from `path`, warning and falling back to defaults on error
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match Self::try_load_from(path) {
                Ok(config) => return config,
                Err(e) => eprintln!("Warning: {:#}", e),
            }
        }
        Self::default()
    }

    /// Load config from `path`, failing on read or parse errors
    pub fn try_load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn actuator(&self, actuator: Actuator) -> &ActuatorConfig {
        match actuator {
            Actuator::Slider => &self.slider,
            Actuator::Belt => &self.belt,
        }
    }

    /// Build the relay process for one actuator.
    pub fn relay(&self, actuator: Actuator) -> Result<ProcessRelay> {
        let settings = self.actuator(actuator);
        let command = RelayCommand::parse(&settings.relay)
            .with_context(|| format!("Invalid {} relay command", actuator))?;
        Ok(ProcessRelay::new(actuator.to_string(), command)
            .with_timeout(timeout(settings.timeout_secs)))
    }

    /// Build the command channel for one actuator.
    pub fn channel<R>(&self, actuator: Actuator, relay: R) -> CommandChannel<R>
    where
        R: spinrig_core::Relay,
    {
        let settings = self.actuator(actuator);
        let mut mailbox = Mailbox::new(&settings.mailbox);
        if let Some(codes) = settings.codes {
            mailbox = mailbox.with_belt_codes(codes);
        }
        CommandChannel::new(actuator, mailbox, relay).with_messages(self.messages.clone())
    }

    pub fn sensor_relay(&self) -> Result<ProcessRelay> {
        let command =
            RelayCommand::parse(&self.sensor.relay).context("Invalid sensor relay command")?;
        Ok(ProcessRelay::new("sensor", command).with_timeout(timeout(self.sensor.timeout_secs)))
    }

    /// Build all three relays for a worker.
    pub fn rig(&self) -> Result<Rig> {
        let slider: DynRelay = Arc::new(self.relay(Actuator::Slider)?);
        let belt: DynRelay = Arc::new(self.relay(Actuator::Belt)?);
        let sensor: DynRelay = Arc::new(self.sensor_relay()?);
        Ok(Rig {
            slider: self.channel(Actuator::Slider, slider),
            belt: self.channel(Actuator::Belt, belt),
            sensor: SensorPoller::new(sensor),
        })
    }

    pub fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            sensor_interval: Duration::from_secs(self.sensor.interval_secs),
            initial_minutes: self.timer.initial_minutes,
            reset_minutes: self.timer.reset_minutes,
            band: self.humidity,
            ..WorkerOptions::default()
        }
    }

    /// Clamp a configured speed into the accepted range.
    pub fn default_speed(&self) -> u32 {
        self.controls
            .speed
            .clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end())
    }

    /// Clamp a configured step into the accepted range.
    pub fn default_step(&self) -> u32 {
        self.controls
            .step
            .clamp(*STEP_RANGE.start(), *STEP_RANGE.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rig_paths() {
        let config = Config::default();
        assert_eq!(
            config.slider.mailbox,
            PathBuf::from("/home/pi/temp/bluetooth.txt")
        );
        assert_eq!(
            config.belt.mailbox,
            PathBuf::from("/home/pi/temp/bluetoothSM.txt")
        );
        assert_eq!(config.belt.relay, "sudo python /home/pi/temp/bluetoothSM.py");
        assert_eq!(config.sensor.interval_secs, 2);
        assert_eq!(config.timer.initial_minutes, 1);
        assert_eq!(config.timer.reset_minutes, 20);
        assert_eq!(config.controls.speed, 100);
        assert_eq!(config.controls.step, 300);
        assert!(config.humidity.gate);
    }

    #[test]
    fn test_empty_file_gives_stock_settings() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [belt]
            mailbox = "/tmp/belt.txt"
            relay = "sh belt.sh"

            [humidity]
            gate = false

            [messages]
            success = "OK"
            "#,
        )
        .unwrap();

        assert_eq!(config.belt.mailbox, PathBuf::from("/tmp/belt.txt"));
        assert_eq!(config.belt.timeout_secs, 30);
        assert!(!config.humidity.gate);
        assert_eq!(config.humidity.min, 45.0);
        assert_eq!(config.messages.success, "OK");
        assert_eq!(config.messages.file_missing, "Python: File is missing.");
        assert_eq!(config.slider, ActuatorConfig::slider());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.timer.initial_minutes = 20;
        config.save_to(&path).unwrap();

        assert_eq!(Config::try_load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_from_invalid_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "slider = 3").unwrap();

        assert!(Config::try_load_from(&path).is_err());
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            Config::load_from(&dir.path().join("absent.toml")),
            Config::default()
        );
    }

    #[test]
    fn test_relay_timeout_zero_waits_forever() {
        let mut config = Config::default();
        config.slider.timeout_secs = 0;
        let relay = config.relay(Actuator::Slider).unwrap();
        assert_eq!(relay.timeout(), None);
        assert_eq!(relay.command().program, "sudo");
    }

    #[test]
    fn test_empty_relay_is_error() {
        let mut config = Config::default();
        config.sensor.relay = String::new();
        assert!(config.sensor_relay().is_err());
        assert!(config.rig().is_err());
    }

    #[test]
    fn test_worker_options_from_config() {
        let mut config = Config::default();
        config.sensor.interval_secs = 5;
        config.humidity.max = 60.0;

        let options = config.worker_options();
        assert_eq!(options.sensor_interval, Duration::from_secs(5));
        assert_eq!(options.band.max, 60.0);
        assert_eq!(options.initial_minutes, 1);
    }

    #[test]
    fn test_default_controls_are_clamped() {
        let mut config = Config::default();
        config.controls.speed = 5000;
        config.controls.step = 1;
        assert_eq!(config.default_speed(), 1001);
        assert_eq!(config.default_step(), 10);
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let explicit = PathBuf::from("/tmp/spinrig.toml");
        assert_eq!(Config::resolve_path(Some(&explicit)), explicit);
        assert!(Config::resolve_path(None).ends_with("spinrig/config.toml"));
    }

    #[test]
    fn test_belt_codes_reach_the_mailbox() {
        let config: Config = toml::from_str(
            r#"
            [belt]
            mailbox = "/tmp/belt.txt"
            relay = "sh belt.sh"
            codes = { speed = "S" }
            "#,
        )
        .unwrap();

        let codes = config.belt.codes.unwrap();
        assert_eq!(codes.speed, 'S');
        assert_eq!(codes.step, 'z');

        let relay = config.relay(Actuator::Belt).unwrap();
        let channel = config.channel(Actuator::Belt, relay);
        assert_eq!(channel.mailbox().belt_codes().speed, 'S');
        assert_eq!(channel.mailbox().belt_codes().left, 'l');

        let relay = config.relay(Actuator::Slider).unwrap();
        let channel = config.channel(Actuator::Slider, relay);
        assert_eq!(channel.mailbox().belt_codes(), &BeltCodes::default());
    }
}
