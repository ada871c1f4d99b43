//! Message types for UI/worker communication.
//!
//! ```text
//! +------------------+     Command      +------------------+
//! |   Operator UI    | --------------> |    RigWorker     |
//! | (ratatui / CLI)  |                 | (tokio runtime)  |
//! |                  | <-------------- |                  |
//! +------------------+    RigEvent     +------------------+
//! ```
//!
//! The UI never touches rig state directly. It sends [`Command`]s and
//! renders the [`RigSnapshot`] carried by each [`RigEvent::Snapshot`].

use serde::Serialize;
use time::OffsetDateTime;

use spinrig_types::{ConnectionState, ControlSet, LinkStatus, RelayOutcome, RigCommand, SensorReading};

use crate::rig::Rejection;
use crate::timer::TimerState;

/// Commands sent from the UI to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send one actuator command through its relay.
    Send(RigCommand),
    /// Change the acquisition preset (1..=60 minutes, idle only).
    SetTimerMinutes(u32),
    /// Start the timed acquisition on both actuators.
    StartAcquisition,
    /// Read the sensor now instead of waiting for the next poll.
    PollSensor,
    /// Stop the worker and its tasks.
    Shutdown,
}

/// Events sent from the worker to the UI.
#[derive(Debug, Clone)]
pub enum RigEvent {
    /// Full state after any change.
    Snapshot(Box<RigSnapshot>),

    /// A relay run finished and was classified.
    CommandCompleted {
        command: RigCommand,
        outcome: RelayOutcome,
    },

    /// A relay could not be run at all.
    CommandFailed { command: RigCommand, error: String },

    /// The sensor poll failed; the previous reading is kept.
    SensorFailed {
        error: String,
        consecutive_failures: u32,
    },

    /// An acquisition started with the given minutes.
    AcquisitionStarted { minutes: u32 },

    /// The countdown reached 0:00.
    AcquisitionFinished,

    /// A command was refused without touching any relay.
    Rejected(Rejection),
}

/// Immutable copy of everything the operator sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RigSnapshot {
    /// Wall clock at the time of the snapshot.
    #[serde(with = "time::serde::rfc3339")]
    pub clock: OffsetDateTime,
    pub timer: TimerState,
    /// Last good sensor reading (`0.0, 0.0` until the first success).
    pub reading: SensorReading,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reading_updated: Option<OffsetDateTime>,
    /// Whether humidity permits starting an acquisition.
    pub humidity_in_band: bool,
    pub slider: ConnectionState,
    pub belt: ConnectionState,
    pub link: LinkStatus,
    pub controls: ControlSet,
}

impl RigSnapshot {
    pub fn is_acquiring(&self) -> bool {
        self.timer.is_running()
    }
}
