//! Transport port — delivers a single intent to a single device.

use std::future::Future;
use std::time::Duration;

use porchlight_domain::device::Device;
use porchlight_domain::intent::Intent;

/// Why a single delivery attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The device did not answer within the configured bound.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Connecting, writing, or reading failed.
    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),

    /// The device answered with a non-success HTTP status.
    #[error("device answered with HTTP {0}")]
    Status(u16),

    /// The HTTP client failed before a response arrived.
    #[error("request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The external control tool exited unsuccessfully.
    #[error("command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },
}

/// Sends one intent to one device, exactly once. Retrying is the caller's job.
pub trait DeviceTransport {
    /// Deliver `intent` and return the device's response text.
    fn send(
        &self,
        device: &Device,
        intent: Intent,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

impl<T: DeviceTransport + Send + Sync> DeviceTransport for std::sync::Arc<T> {
    fn send(
        &self,
        device: &Device,
        intent: Intent,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        (**self).send(device, intent)
    }
}
