//! Dispatch outcomes — per-device results and the fan-out report.

use std::net::IpAddr;

use serde::Serialize;

use crate::intent::Intent;

/// Result of sending one intent to one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceOutcome {
    pub name: String,
    pub address: IpAddr,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeviceOutcome {
    #[must_use]
    pub fn succeeded(name: impl Into<String>, address: IpAddr, response: String) -> Self {
        Self {
            name: name.into(),
            address,
            success: true,
            response: Some(response),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(name: impl Into<String>, address: IpAddr, error: String) -> Self {
        Self {
            name: name.into(),
            address,
            success: false,
            response: None,
            error: Some(error),
        }
    }
}

/// Aggregated result of sending the same intent to every registered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanOutReport {
    pub intent: Intent,
    pub outcomes: Vec<DeviceOutcome>,
}

impl FanOutReport {
    /// `true` when every device accepted the command (vacuously true when
    /// the registry is empty).
    #[must_use]
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    /// Names of the devices that failed, in registry order.
    #[must_use]
    pub fn failed_devices(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.name.as_str())
            .collect()
    }

    /// Human-readable failure summary, e.g. `Failed to turn off: Porch, Lamp`.
    #[must_use]
    pub fn failure_summary(&self) -> Option<String> {
        let failed = self.failed_devices();
        if failed.is_empty() {
            return None;
        }
        Some(format!(
            "Failed to turn {}: {}",
            self.intent.plug_action(),
            failed.join(", ")
        ))
    }
}
