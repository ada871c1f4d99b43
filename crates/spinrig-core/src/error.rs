//! Error types for spinrig-core.
//!
//! Every failure the relay plumbing can hit is represented here so library
//! callers get a typed error. The [`RigWorker`](crate::RigWorker) absorbs
//! these the way the operator panel expects: a command failure flips the
//! relay's connection state to disabled, a sensor failure keeps the last
//! reading, and both are logged.
//!
//! | Error | Typical cause | Worker policy |
//! |-------|---------------|---------------|
//! | [`Error::Mailbox`] | mailbox directory not writable | connection disabled |
//! | [`Error::RelayLaunch`] | relay program not installed | connection disabled |
//! | [`Error::RelayTimeout`] | relay hung waiting on Bluetooth | connection disabled |
//! | [`Error::Parse`] | sensor missing or garbled output | reading kept |
//! | [`Error::InvalidConfig`] | bad relay command line or interval | startup fails |

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while driving the rig's relays.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Writing the command mailbox failed.
    #[error("Failed to write mailbox {path}: {source}")]
    Mailbox {
        /// The mailbox file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The relay process could not be started or waited on.
    #[error("Failed to run relay '{program}': {source}")]
    RelayLaunch {
        /// The relay program.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The relay did not exit in time and was killed.
    #[error("Relay '{program}' timed out after {duration:?}")]
    RelayTimeout {
        /// The relay program.
        program: String,
        /// The configured timeout.
        duration: Duration,
    },

    /// Relay output could not be parsed.
    #[error(transparent)]
    Parse(#[from] spinrig_types::ParseError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker is no longer running.
    #[error("Rig worker has stopped")]
    WorkerStopped,
}

impl Error {
    /// Create a mailbox write error.
    pub fn mailbox(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Mailbox {
            path: path.into(),
            source,
        }
    }

    /// Create a relay launch error.
    pub fn relay_launch(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::RelayLaunch {
            program: program.into(),
            source,
        }
    }

    /// Create a relay timeout error.
    pub fn relay_timeout(program: impl Into<String>, duration: Duration) -> Self {
        Self::RelayTimeout {
            program: program.into(),
            duration,
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias using spinrig-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use spinrig_types::ParseError;

    #[test]
    fn test_error_display() {
        let err = Error::relay_timeout("python", Duration::from_secs(30));
        assert!(err.to_string().contains("python"));
        assert!(err.to_string().contains("30s"));

        let err = Error::invalid_config("empty relay command");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: empty relay command"
        );

        let err = Error::WorkerStopped;
        assert_eq!(err.to_string(), "Rig worker has stopped");
    }

    #[test]
    fn test_mailbox_error_mentions_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::mailbox("/home/pi/temp/bluetooth.txt", io);
        assert!(err.to_string().contains("/home/pi/temp/bluetooth.txt"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: Error = ParseError::ReadFailed.into();
        assert!(matches!(err, Error::Parse(ParseError::ReadFailed)));
        assert_eq!(err.to_string(), "Sensor read failed");
    }
}
