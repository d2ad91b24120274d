//! Flat device registry format.
//!
//! One device per line, `name - address`, with an optional third field
//! naming the kind (`name - address - http`). A leading `$` on the name marks
//! a smart plug. Blank lines, `#` comments, and lines without a `-` are
//! ignored. Bad entries are reported as [`RegistryIssue`]s and skipped so the
//! rest of the file still loads.

use std::collections::HashSet;
use std::net::IpAddr;

use crate::device::{Device, DeviceKind};

/// Name prefix marking a smart-plug device.
pub const SMART_PLUG_PREFIX: char = '$';

/// A registry line that could not be turned into a device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryIssue {
    #[error("line {line}: expected `name - address [- kind]`, got {text:?}")]
    Malformed { line: usize, text: String },

    #[error("line {line}: invalid address {address:?} for {name:?}")]
    InvalidAddress {
        line: usize,
        name: String,
        address: String,
    },

    #[error("line {line}: unknown kind {kind:?} for {name:?}")]
    UnknownKind {
        line: usize,
        name: String,
        kind: String,
    },

    #[error("line {line}: duplicate device name {name:?}, keeping the first entry")]
    DuplicateName { line: usize, name: String },
}

/// Result of parsing a registry file.
#[derive(Debug, Default)]
pub struct ParsedRegistry {
    /// Valid devices in file order.
    pub devices: Vec<Device>,
    /// Entries that were skipped.
    pub issues: Vec<RegistryIssue>,
}

/// Parse registry text. Devices with neither a `$` prefix nor an explicit
/// kind get `default_kind`.
#[must_use]
pub fn parse(content: &str, default_kind: DeviceKind) -> ParsedRegistry {
    let mut parsed = ParsedRegistry::default();
    let mut seen = HashSet::new();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') || !text.contains('-') {
            continue;
        }

        match parse_line(line, text, default_kind) {
            Ok(device) => {
                if seen.insert(device.name.clone()) {
                    parsed.devices.push(device);
                } else {
                    parsed.issues.push(RegistryIssue::DuplicateName {
                        line,
                        name: device.name,
                    });
                }
            }
            Err(issue) => parsed.issues.push(issue),
        }
    }

    parsed
}

fn parse_line(line: usize, text: &str, default_kind: DeviceKind) -> Result<Device, RegistryIssue> {
    let malformed = || RegistryIssue::Malformed {
        line,
        text: text.to_string(),
    };

    let parts: Vec<&str> = text.split('-').map(str::trim).collect();
    let (raw_name, raw_address, raw_kind) = match parts.as_slice() {
        [name, address] => (*name, *address, None),
        [name, address, kind] => (*name, *address, Some(*kind)),
        _ => return Err(malformed()),
    };

    let (name, marked_plug) = match raw_name.strip_prefix(SMART_PLUG_PREFIX) {
        Some(stripped) => (stripped.trim(), true),
        None => (raw_name, false),
    };
    if name.is_empty() {
        return Err(malformed());
    }

    let address: IpAddr = raw_address
        .parse()
        .map_err(|_| RegistryIssue::InvalidAddress {
            line,
            name: name.to_string(),
            address: raw_address.to_string(),
        })?;

    let kind = match raw_kind {
        Some(kind) => kind.parse().map_err(|_| RegistryIssue::UnknownKind {
            line,
            name: name.to_string(),
            kind: kind.to_string(),
        })?,
        None if marked_plug => DeviceKind::SmartPlug,
        None => default_kind,
    };

    Device::builder()
        .name(name)
        .address(address)
        .kind(kind)
        .build()
        .map_err(|_| malformed())
}
