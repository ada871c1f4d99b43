//! Command implementations for the CLI.

mod acquire;
mod config;
mod send;
mod sensor;

pub use acquire::cmd_acquire;
pub use config::cmd_config;
pub use send::cmd_send;
pub use sensor::{SensorArgs, cmd_sensor};
