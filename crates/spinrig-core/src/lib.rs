//! Relay plumbing for the spinrig electrospinning control panel.
//!
//! The rig's actuators and sensor sit behind external helper programs
//! ("relays"). This crate writes commands to their mailbox files, runs the
//! relays, classifies what they print and keeps the resulting state.
//!
//! # Features
//!
//! - **Command channels**: mailbox encoding plus relay invocation per actuator
//! - **Status classification**: exact-match relay output to connection state
//! - **Sensor polling**: temperature/humidity with last-known fallback
//! - **Acquisition countdown**: idle/running timer with expiry reset
//! - **Background worker**: one task owns all state and publishes snapshots
//!
//! # Quick Start
//!
//! ```no_run
//! use spinrig_core::{CommandChannel, Mailbox, ProcessRelay, RelayCommand};
//! use spinrig_types::{Actuator, SliderCommand};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let relay = ProcessRelay::new(
//!         "slider",
//!         RelayCommand::parse("sudo python /home/pi/temp/bluetoothHC06.py")?,
//!     );
//!     let mut slider = CommandChannel::new(
//!         Actuator::Slider,
//!         Mailbox::new("/home/pi/temp/bluetooth.txt"),
//!         relay,
//!     );
//!
//!     let report = slider.send(SliderCommand::Up.into()).await?;
//!     println!("{} -> {}", report.command, report.outcome);
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod error;
pub mod mailbox;
pub mod messages;
pub mod mock;
pub mod relay;
pub mod rig;
pub mod sensor;
pub mod thresholds;
pub mod timer;
pub mod traits;
pub mod worker;

pub use channel::{CommandChannel, RelayReport};
pub use error::{Error, Result};
pub use mailbox::{BeltCodes, Mailbox};
pub use messages::{Command, RigEvent, RigSnapshot};
pub use mock::MockRelay;
pub use relay::{DEFAULT_RELAY_TIMEOUT, ProcessRelay, RelayCommand, RelayMessages, RelayOutput};
pub use rig::{Rejection, RigState};
pub use sensor::SensorPoller;
pub use thresholds::HumidityBand;
pub use timer::{Countdown, StartOutcome, Tick, Timer, TimerError, TimerState};
pub use traits::Relay;
pub use worker::{DynRelay, Rig, RigHandle, RigWorker, WorkerOptions};

// Re-export the shared types so callers need only one dependency.
pub use spinrig_types;
pub use spinrig_types::{
    Actuator, BeltCommand, ConnectionState, Control, ControlSet, LinkStatus, ParseError,
    RelayOutcome, RigCommand, SensorReading, SliderCommand,
};
