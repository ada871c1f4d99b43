//! Acquisition countdown.
//!
//! ```text
//!   start()            tick() ... 0:00
//! Idle ────────▶ Running ──────────────▶ Expired ─▶ Idle (preset 20:00)
//! ```
//!
//! `start()` while running is a no-op, and the preset can only be changed
//! while idle.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Preset at start-up, in minutes.
pub const DEFAULT_INITIAL_MINUTES: u32 = 1;
/// Preset after an acquisition expires, in minutes.
pub const DEFAULT_RESET_MINUTES: u32 = 20;
/// Minutes accepted by [`Timer::set_minutes`].
pub const MINUTES_RANGE: std::ops::RangeInclusive<u32> = 1..=60;

/// A `minutes:seconds` countdown value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Countdown {
    pub minutes: u32,
    pub seconds: u32,
}

impl Countdown {
    pub const ZERO: Countdown = Countdown {
        minutes: 0,
        seconds: 0,
    };

    pub fn from_minutes(minutes: u32) -> Self {
        Self {
            minutes,
            seconds: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    /// One second less; `m:00` becomes `(m-1):59`. Zero stays zero.
    pub fn decremented(self) -> Self {
        match (self.minutes, self.seconds) {
            (0, 0) => Self::ZERO,
            (m, 0) => Self {
                minutes: m - 1,
                seconds: 59,
            },
            (m, s) => Self {
                minutes: m,
                seconds: s - 1,
            },
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Where the countdown is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimerState {
    Idle { preset: Countdown },
    Running { remaining: Countdown },
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running { .. })
    }

    /// The value to display: the preset when idle, the remainder when running.
    pub fn display(&self) -> Countdown {
        match self {
            TimerState::Idle { preset } => *preset,
            TimerState::Running { remaining } => *remaining,
        }
    }
}

/// Result of [`Timer::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(Countdown),
    AlreadyRunning,
}

/// Result of [`Timer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing is running.
    Idle,
    /// Still counting; carries the remaining time.
    Running(Countdown),
    /// Reached 0:00; the timer is idle again with the reset preset.
    Expired,
}

/// Why a preset change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("Timer is running")]
    Running,
    #[error("Minutes must be between 1 and 60, got {0}")]
    OutOfRange(u32),
}

/// The acquisition countdown state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    state: TimerState,
    reset: Countdown,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_MINUTES, DEFAULT_RESET_MINUTES)
    }
}

impl Timer {
    /// Create an idle timer with `initial` minutes preset that resets to
    /// `reset` minutes after expiry.
    pub fn new(initial: u32, reset: u32) -> Self {
        Self {
            state: TimerState::Idle {
                preset: Countdown::from_minutes(initial),
            },
            reset: Countdown::from_minutes(reset),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Minutes of the current preset, or of the remaining time if running.
    pub fn minutes(&self) -> u32 {
        self.state.display().minutes
    }

    pub fn start(&mut self) -> StartOutcome {
        match self.state {
            TimerState::Running { .. } => StartOutcome::AlreadyRunning,
            TimerState::Idle { preset } => {
                self.state = TimerState::Running { remaining: preset };
                StartOutcome::Started(preset)
            }
        }
    }

    /// Advance one second.
    pub fn tick(&mut self) -> Tick {
        let TimerState::Running { remaining } = self.state else {
            return Tick::Idle;
        };
        let next = remaining.decremented();
        if next.is_zero() {
            self.state = TimerState::Idle { preset: self.reset };
            Tick::Expired
        } else {
            self.state = TimerState::Running { remaining: next };
            Tick::Running(next)
        }
    }

    /// Change the preset while idle.
    pub fn set_minutes(&mut self, minutes: u32) -> Result<Countdown, TimerError> {
        if self.is_running() {
            return Err(TimerError::Running);
        }
        if !MINUTES_RANGE.contains(&minutes) {
            return Err(TimerError::OutOfRange(minutes));
        }
        let preset = Countdown::from_minutes(minutes);
        self.state = TimerState::Idle { preset };
        Ok(preset)
    }
}
