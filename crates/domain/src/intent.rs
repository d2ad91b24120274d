//! Intent — the abstract ON/OFF command a caller asks for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// What the caller wants a device to do, independent of its wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    On,
    Off,
}

impl Intent {
    /// Servo angle sent to HTTP and Telnet fixtures: `"0"` is on, `"180"` is off.
    #[must_use]
    pub fn servo_position(self) -> &'static str {
        match self {
            Self::On => "0",
            Self::Off => "180",
        }
    }

    /// Action argument understood by the smart-plug tool.
    #[must_use]
    pub fn plug_action(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
        }
    }
}

impl FromStr for Intent {
    type Err = ValidationError;

    /// Case-insensitive: `on`, `ON`, and `On` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("on") {
            Ok(Self::On)
        } else if s.eq_ignore_ascii_case("off") {
            Ok(Self::Off)
        } else {
            Err(ValidationError::InvalidAction(s.to_string()))
        }
    }
}
