//! The command mailbox file read by a relay.
//!
//! Before each relay invocation the pending command is written to a plain
//! text file the relay script reads. The format is the decimal digits of the
//! value, least-significant digit first, one per line, followed by the
//! single-character command code on the last line with no trailing newline:
//!
//! | Command | Mailbox content |
//! |---------|-----------------|
//! | `SetSpeed(120)` | `0\n2\n1\nv` |
//! | `SetStep(300)` | `0\n0\n3\nz` |
//! | `Up` | `u` |
//!
//! A value of 0 writes only the code line.
//!
//! Slider codes are fixed by the pump board. Belt codes come from
//! [`BeltCodes`], which a mailbox may override.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use spinrig_types::{BeltCommand, RigCommand};

use crate::error::{Error, Result};

/// Encode a command into mailbox text.
///
/// # Examples
///
/// ```
/// use spinrig_core::mailbox::encode;
/// use spinrig_types::{BeltCommand, SliderCommand};
///
/// assert_eq!(encode(&BeltCommand::SetSpeed(120).into()), "0\n2\n1\nv");
/// assert_eq!(encode(&SliderCommand::Stop.into()), "s");
/// ```
pub fn encode(command: &RigCommand) -> String {
    encode_with(command, &BeltCodes::default())
}

/// Encode a command, taking belt codes from `codes`.
pub fn encode_with(command: &RigCommand, codes: &BeltCodes) -> String {
    let code = match command {
        RigCommand::Belt(belt) => codes.code(belt),
        RigCommand::Slider(_) => command.code(),
    };
    encode_parts(code, command.value())
}

/// Codes the stepper belt board reads on the mailbox's last line.
///
/// Missing entries fall back to [`BeltCommand::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltCodes {
    pub speed: char,
    pub step: char,
    pub left: char,
    pub right: char,
    pub timer: char,
}

impl Default for BeltCodes {
    fn default() -> Self {
        Self {
            speed: BeltCommand::SetSpeed(0).code(),
            step: BeltCommand::SetStep(0).code(),
            left: BeltCommand::Left.code(),
            right: BeltCommand::Right.code(),
            timer: BeltCommand::StartTimer(0).code(),
        }
    }
}

impl BeltCodes {
    pub fn code(&self, command: &BeltCommand) -> char {
        match command {
            BeltCommand::SetSpeed(_) => self.speed,
            BeltCommand::SetStep(_) => self.step,
            BeltCommand::Left => self.left,
            BeltCommand::Right => self.right,
            BeltCommand::StartTimer(_) => self.timer,
        }
    }
}

fn encode_parts(code: char, mut value: u32) -> String {
    let mut out = String::new();
    while value > 0 {
        out.push(char::from(b'0' + (value % 10) as u8));
        out.push('\n');
        value /= 10;
    }
    out.push(code);
    out
}

/// A mailbox file owned by one command channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    path: PathBuf,
    belt_codes: BeltCodes,
}

impl Mailbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            belt_codes: BeltCodes::default(),
        }
    }

    /// Use `codes` for belt commands written to this mailbox.
    pub fn with_belt_codes(mut self, codes: BeltCodes) -> Self {
        self.belt_codes = codes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn belt_codes(&self) -> &BeltCodes {
        &self.belt_codes
    }

    /// Overwrite the mailbox with `command`, creating parent directories.
    pub async fn write(&self, command: &RigCommand) -> Result<()> {
        let contents = encode_with(command, &self.belt_codes);
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::mailbox(&self.path, e))?;
        }
        tokio::fs::write(&self.path, contents.as_bytes())
            .await
            .map_err(|e| Error::mailbox(&self.path, e))?;
        debug!(path = %self.path.display(), %command, "Wrote mailbox");
        Ok(())
    }
}
