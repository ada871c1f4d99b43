//! Command channel: mailbox plus relay for one actuator.
//!
//! Sending a command overwrites the mailbox, runs the relay and classifies
//! its output. The channel remembers the resulting [`ConnectionState`];
//! only a [`RelayOutcome::Success`] leaves it enabled.

use tracing::{debug, warn};

use spinrig_types::{Actuator, ConnectionState, RelayOutcome, RigCommand};

use crate::error::Result;
use crate::mailbox::Mailbox;
use crate::relay::{RelayMessages, RelayOutput};
use crate::traits::Relay;

/// What one send produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReport {
    pub command: RigCommand,
    pub outcome: RelayOutcome,
    pub output: RelayOutput,
}

impl RelayReport {
    pub fn connection_state(&self) -> ConnectionState {
        self.outcome.connection_state()
    }
}

/// One actuator's path to the controller.
#[derive(Debug)]
pub struct CommandChannel<R> {
    actuator: Actuator,
    mailbox: Mailbox,
    relay: R,
    messages: RelayMessages,
    state: ConnectionState,
}

impl<R: Relay> CommandChannel<R> {
    /// Create a channel that starts out [`ConnectionState::Enabled`].
    pub fn new(actuator: Actuator, mailbox: Mailbox, relay: R) -> Self {
        Self {
            actuator,
            mailbox,
            relay,
            messages: RelayMessages::default(),
            state: ConnectionState::default(),
        }
    }

    /// Use custom classification literals.
    pub fn with_messages(mut self, messages: RelayMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn actuator(&self) -> Actuator {
        self.actuator
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    /// Connection state after the most recent send.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Write `command` to the mailbox, run the relay and classify the result.
    ///
    /// Any error (mailbox, launch, timeout) also leaves the channel
    /// disabled.
    pub async fn send(&mut self, command: RigCommand) -> Result<RelayReport> {
        debug_assert_eq!(command.actuator(), self.actuator);

        match self.try_send(command).await {
            Ok(report) => {
                self.state = report.connection_state();
                debug!(actuator = %self.actuator, %command, outcome = %report.outcome, "Command sent");
                Ok(report)
            }
            Err(e) => {
                warn!(actuator = %self.actuator, %command, error = %e, "Command failed");
                self.state = ConnectionState::Disabled;
                Err(e)
            }
        }
    }

    async fn try_send(&self, command: RigCommand) -> Result<RelayReport> {
        self.mailbox.write(&command).await?;
        let output = self.relay.invoke().await?;
        let outcome = self.messages.classify(&output.stdout);
        Ok(RelayReport {
            command,
            outcome,
            output,
        })
    }
}
