//! Device registry port — the set of controllable devices.

use std::future::Future;

use porchlight_domain::device::Device;
use porchlight_domain::error::PorchlightError;

/// Provides the current list of devices.
///
/// Implementations re-read their source on every call; callers must not
/// assume two loads return the same devices.
pub trait DeviceRegistry {
    /// Load every valid device, in registry order. Invalid entries are
    /// skipped by the implementation, not reported as errors.
    fn load(&self) -> impl Future<Output = Result<Vec<Device>, PorchlightError>> + Send;
}

impl<T: DeviceRegistry + Send + Sync> DeviceRegistry for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Vec<Device>, PorchlightError>> + Send {
        (**self).load()
    }
}
