//! Command-line interface and terminal control panel for the spinrig
//! electrospinning rig.
//!
//! The rig is a syringe-pump slider and a stepper-motor belt driven through
//! Bluetooth relay scripts, plus a DHT temperature/humidity sensor.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `slider` | Move, stop or time the syringe-pump slider |
//! | `belt` | Set speed or step, move, or time the stepper belt |
//! | `sensor` | Read temperature and humidity |
//! | `acquire` | Run a timed acquisition without the dashboard |
//! | `dashboard` | Launch the terminal control panel |
//! | `protocol` | Show the sample preparation reminders |
//! | `config` | Manage configuration |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! The CLI reads `~/.config/spinrig/config.toml` (or platform equivalent),
//! overridden by `--config` or `SPINRIG_CONFIG`. See [`config::Config`].
//!
//! # Environment Variables
//!
//! - `SPINRIG_CONFIG`: Config file path
//! - `NO_COLOR`: Disable colored output when set
//! - `RUST_LOG`: Log filter when neither `--verbose` nor `--quiet` is given
//!
//! # Examples
//!
//! ```bash
//! spinrig belt speed 120
//! spinrig sensor --watch
//! spinrig acquire --minutes 20
//! ```

pub mod config;
pub mod logging;
pub mod protocol;

// Re-export core dependencies for convenience
pub use spinrig_core;
pub use spinrig_types;

// TUI module - publicly exposed for spinrig-tui crate to use
#[cfg(feature = "tui")]
pub mod tui;
