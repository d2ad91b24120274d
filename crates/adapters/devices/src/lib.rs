//! # porchlight-adapter-devices
//!
//! Everything that touches the physical fixtures.
//!
//! ## Responsibilities
//! - Load the device registry file on every request (`DeviceRegistry` port)
//! - Attach configured quirks to devices as hooks
//! - Deliver intents over the wire (`DeviceTransport` port):
//!   - `HttpTransport` — JSON POST to the fixture's control endpoint
//!   - `TelnetTransport` — one command line over TCP, one line back
//!   - `PlugTransport` — the smart-plug control tool as a subprocess
//!   - `DeviceTransports` — routes each device to the transport for its kind
//!
//! ## Dependency rule
//! Depends on `porchlight-app` (for port traits) and `porchlight-domain` (for domain types).

mod config;
mod http;
mod plug;
mod registry;
mod telnet;
mod transports;

pub use config::{Quirk, TransportConfig};
pub use http::HttpTransport;
pub use plug::PlugTransport;
pub use registry::{FileDeviceRegistry, RegistryError};
pub use telnet::TelnetTransport;
pub use transports::DeviceTransports;
