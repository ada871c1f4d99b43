//! One-shot actuator commands.

use std::io::{self, Write};

use anyhow::Result;
use tracing::debug;

use spinrig_cli::config::Config;
use spinrig_types::{LinkStatus, RigCommand};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, SendResult, format_send_json, format_send_text};
use crate::style;

/// Send one command through its actuator's relay.
///
/// Returns whether the relay passed the message.
pub async fn cmd_send(
    config: &Config,
    command: RigCommand,
    format: OutputFormat,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<bool> {
    let actuator = command.actuator();
    let relay = config.relay(actuator)?;
    let mut channel = config.channel(actuator, relay);
    debug!(%command, mailbox = %channel.mailbox().path().display(), "Sending command");

    let spinner = style::maybe_spinner(
        !quiet && format == OutputFormat::Text,
        &format!("Sending {}...", command),
    );
    let sent = channel.send(command).await;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }

    let link = LinkStatus::after(actuator, channel.state());
    let result = match sent {
        Ok(report) => SendResult {
            command,
            outcome: Some(report.outcome),
            error: None,
            link,
        },
        Err(e) => SendResult {
            command,
            outcome: None,
            error: Some(e.to_string()),
            link,
        },
    };

    let content = match format {
        OutputFormat::Text => format_send_text(&result, opts),
        OutputFormat::Json => format_send_json(&result)?,
    };
    print!("{}", content);
    io::stdout().flush()?;

    Ok(result.succeeded())
}
