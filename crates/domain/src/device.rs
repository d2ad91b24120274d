//! Device — a light fixture, servo, or smart plug reachable on the network.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PorchlightError, ValidationError};
use crate::intent::Intent;

/// How a device is driven on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// HTTP POST of a servo position to the fixture's control path.
    DirectHttp,
    /// One command line over a Telnet session on port 23.
    TelnetServo,
    /// Smart plug driven through the external plug-control tool.
    SmartPlug,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectHttp => f.write_str("direct_http"),
            Self::TelnetServo => f.write_str("telnet_servo"),
            Self::SmartPlug => f.write_str("smart_plug"),
        }
    }
}

/// Error returned when a device kind name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device kind {0:?}")]
pub struct UnknownDeviceKind(pub String);

impl FromStr for DeviceKind {
    type Err = UnknownDeviceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "direct_http" => Ok(Self::DirectHttp),
            "telnet" | "telnet_servo" => Ok(Self::TelnetServo),
            "plug" | "kasa" | "smart_plug" => Ok(Self::SmartPlug),
            _ => Err(UnknownDeviceKind(s.to_string())),
        }
    }
}

/// Declarative per-device behaviour that runs after a successful command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceHook {
    /// Switch the device back on a short while after it was switched off.
    /// Used for plugs whose load must never stay latched off.
    ReassertOn {
        /// Milliseconds to wait after the OFF before sending ON.
        after_ms: u64,
    },
}

impl DeviceHook {
    /// The follow-up command this hook wants after `intent` succeeded, if any.
    #[must_use]
    pub fn follow_up(self, intent: Intent) -> Option<(Duration, Intent)> {
        match (self, intent) {
            (Self::ReassertOn { after_ms }, Intent::Off) => {
                Some((Duration::from_millis(after_ms), Intent::On))
            }
            (Self::ReassertOn { .. }, Intent::On) => None,
        }
    }
}

/// A controllable device loaded from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub address: IpAddr,
    pub kind: DeviceKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<DeviceHook>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PorchlightError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), PorchlightError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    name: Option<String>,
    address: Option<IpAddr>,
    kind: Option<DeviceKind>,
    hooks: Vec<DeviceHook>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn hook(mut self, hook: DeviceHook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// The address defaults to the unspecified IPv4 address and the kind to
    /// [`DeviceKind::TelnetServo`].
    ///
    /// # Errors
    ///
    /// Returns [`PorchlightError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Device, PorchlightError> {
        let device = Device {
            name: self.name.unwrap_or_default(),
            address: self
                .address
                .unwrap_or(IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)),
            kind: self.kind.unwrap_or(DeviceKind::TelnetServo),
            hooks: self.hooks,
        };
        device.validate()?;
        Ok(device)
    }
}
