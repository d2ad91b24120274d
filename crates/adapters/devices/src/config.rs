//! Transport settings and device quirks.

use std::net::IpAddr;
use std::time::Duration;

use porchlight_domain::device::DeviceHook;

/// Connection settings shared by every transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound for connecting and for waiting on a reply.
    pub timeout: Duration,
    /// Smart-plug control tool, invoked as `<tool> --host <address> on|off`.
    pub plug_command: String,
    /// Path of the control endpoint on HTTP fixtures.
    pub http_control_path: String,
    /// Port of HTTP fixtures; `None` means the scheme default.
    pub http_port: Option<u16>,
    pub telnet_port: u16,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            plug_command: "kasa".to_string(),
            http_control_path: "/servo".to_string(),
            http_port: None,
            telnet_port: 23,
        }
    }
}

/// A hook attached to whichever registry device has `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirk {
    pub address: IpAddr,
    pub hook: DeviceHook,
}
