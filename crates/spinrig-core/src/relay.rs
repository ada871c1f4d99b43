//! Relay invocation and status classification.
//!
//! A relay is an external helper program (a Python Bluetooth script on the
//! rig) that is run to completion. Only its trimmed standard output decides
//! the outcome; the exit code is logged and otherwise ignored.
//!
//! | Output (trimmed) | Outcome |
//! |------------------|---------|
//! | empty | [`RelayOutcome::LibraryMissing`] |
//! | `Python: File is missing.` | [`RelayOutcome::LibraryMissing`] |
//! | `Python: Could not find available Bluetooth device.` | [`RelayOutcome::DeviceNotFound`] |
//! | `Python: Passed message` | [`RelayOutcome::Success`] |
//! | anything else | [`RelayOutcome::Unrecognized`] |

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use spinrig_types::RelayOutcome;

use crate::error::{Error, Result};
use crate::traits::Relay;

/// Default time a relay may run before it is killed.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured result of one relay run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayOutput {
    /// Everything the relay wrote to standard output.
    pub stdout: String,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
}

impl RelayOutput {
    pub fn new(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
        }
    }

    /// Standard output with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// The literal lines relay scripts print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayMessages {
    pub success: String,
    pub device_not_found: String,
    pub file_missing: String,
}

impl Default for RelayMessages {
    fn default() -> Self {
        Self {
            success: "Python: Passed message".to_string(),
            device_not_found: "Python: Could not find available Bluetooth device.".to_string(),
            file_missing: "Python: File is missing.".to_string(),
        }
    }
}

impl RelayMessages {
    /// Classify relay output by exact match against the known lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use spinrig_core::RelayMessages;
    /// use spinrig_types::RelayOutcome;
    ///
    /// let messages = RelayMessages::default();
    /// assert_eq!(messages.classify("Python: Passed message\n"), RelayOutcome::Success);
    /// assert_eq!(messages.classify(""), RelayOutcome::LibraryMissing);
    /// ```
    pub fn classify(&self, output: &str) -> RelayOutcome {
        let output = output.trim();
        if output.is_empty() || output == self.file_missing {
            RelayOutcome::LibraryMissing
        } else if output == self.device_not_found {
            RelayOutcome::DeviceNotFound
        } else if output == self.success {
            RelayOutcome::Success
        } else {
            RelayOutcome::Unrecognized
        }
    }
}

/// A relay command line: a program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RelayCommand {
    /// Split a whitespace-separated command line.
    ///
    /// Quoting is not interpreted; relay command lines on the rig are plain
    /// `sudo python <script>` invocations.
    pub fn parse(line: &str) -> Result<Self> {
        Self::from_argv(line.split_whitespace().map(str::to_string))
    }

    /// Build from an argument vector whose first element is the program.
    pub fn from_argv(argv: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::invalid_config("relay command is empty"))?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }
}

impl std::fmt::Display for RelayCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A relay backed by a real child process.
#[derive(Debug, Clone)]
pub struct ProcessRelay {
    name: String,
    command: RelayCommand,
    timeout: Option<Duration>,
}

impl ProcessRelay {
    /// Create a relay with the default timeout.
    pub fn new(name: impl Into<String>, command: RelayCommand) -> Self {
        Self {
            name: name.into(),
            command,
            timeout: Some(DEFAULT_RELAY_TIMEOUT),
        }
    }

    /// Set the timeout; `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &RelayCommand {
        &self.command
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl Relay for ProcessRelay {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self) -> Result<RelayOutput> {
        let child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::relay_launch(&self.command.program, e))?;

        let output = match self.timeout {
            // Dropping the wait future drops the child, which kills it.
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| Error::relay_timeout(&self.command.program, limit))?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| Error::relay_launch(&self.command.program, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(
            relay = %self.name,
            exit_code = ?output.status.code(),
            stdout = %stdout.trim(),
            stderr = %stderr.trim(),
            "Relay finished"
        );

        Ok(RelayOutput {
            stdout,
            exit_code: output.status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_lines() {
        let messages = RelayMessages::default();
        assert_eq!(
            messages.classify("Python: Passed message"),
            RelayOutcome::Success
        );
        assert_eq!(
            messages.classify("Python: Could not find available Bluetooth device."),
            RelayOutcome::DeviceNotFound
        );
        assert_eq!(
            messages.classify("Python: File is missing."),
            RelayOutcome::LibraryMissing
        );
    }

    #[test]
    fn test_classify_trims_output() {
        let messages = RelayMessages::default();
        assert_eq!(
            messages.classify("  Python: Passed message\r\n"),
            RelayOutcome::Success
        );
        assert_eq!(messages.classify(" \n\t"), RelayOutcome::LibraryMissing);
    }

    #[test]
    fn test_classify_is_exact_match() {
        let messages = RelayMessages::default();
        assert_eq!(
            messages.classify("Python: Passed message twice"),
            RelayOutcome::Unrecognized
        );
        assert_eq!(
            messages.classify("python: passed message"),
            RelayOutcome::Unrecognized
        );
        assert_eq!(
            messages.classify("Traceback (most recent call last):"),
            RelayOutcome::Unrecognized
        );
    }

    #[test]
    fn test_classify_custom_messages() {
        let messages = RelayMessages {
            success: "OK".to_string(),
            ..Default::default()
        };
        assert_eq!(messages.classify("OK\n"), RelayOutcome::Success);
        assert_eq!(
            messages.classify("Python: Passed message"),
            RelayOutcome::Unrecognized
        );
    }

    #[test]
    fn test_relay_messages_partial_deserialize() {
        let messages: RelayMessages = serde_json::from_str(r#"{"success":"done"}"#).unwrap();
        assert_eq!(messages.success, "done");
        assert_eq!(messages.file_missing, "Python: File is missing.");
    }

    #[test]
    fn test_relay_command_parse() {
        let cmd = RelayCommand::parse("sudo python /home/pi/temp/bluetoothHC06.py").unwrap();
        assert_eq!(cmd.program, "sudo");
        assert_eq!(cmd.args, vec!["python", "/home/pi/temp/bluetoothHC06.py"]);
        assert_eq!(cmd.to_string(), "sudo python /home/pi/temp/bluetoothHC06.py");
    }

    #[test]
    fn test_relay_command_empty_is_invalid() {
        assert!(matches!(
            RelayCommand::parse("   "),
            Err(Error::InvalidConfig(_))
        ));
        assert!(RelayCommand::from_argv(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_process_relay_captures_stdout() {
        let command = RelayCommand::from_argv(
            ["sh", "-c", "echo 'Python: Passed message'; echo noise >&2; exit 3"]
                .map(String::from),
        )
        .unwrap();
        let relay = ProcessRelay::new("slider", command);

        let output = relay.invoke().await.unwrap();
        assert_eq!(output.trimmed(), "Python: Passed message");
        assert_eq!(output.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_process_relay_missing_program() {
        let command = RelayCommand::parse("spinrig-no-such-relay-program").unwrap();
        let relay = ProcessRelay::new("slider", command);

        let err = relay.invoke().await.unwrap_err();
        assert!(matches!(err, Error::RelayLaunch { .. }));
    }

    #[tokio::test]
    async fn test_process_relay_timeout() {
        let command = RelayCommand::parse("sleep 5").unwrap();
        let relay = ProcessRelay::new("belt", command)
            .with_timeout(Some(Duration::from_millis(100)));

        let err = relay.invoke().await.unwrap_err();
        assert!(matches!(err, Error::RelayTimeout { .. }));
    }
}
