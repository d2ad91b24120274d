//! File-backed [`DeviceRegistry`].

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use porchlight_app::ports::DeviceRegistry;
use porchlight_domain::device::{Device, DeviceKind};
use porchlight_domain::error::PorchlightError;
use porchlight_domain::registry;

use crate::config::Quirk;

/// Failure to read the registry file for a reason other than it being absent.
#[derive(Debug, thiserror::Error)]
#[error("unable to read device registry {path:?}")]
pub struct RegistryError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl From<RegistryError> for PorchlightError {
    fn from(err: RegistryError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Reads the registry file from disk on every [`load`](DeviceRegistry::load),
/// so edits are picked up without a restart.
#[derive(Debug, Clone)]
pub struct FileDeviceRegistry {
    path: PathBuf,
    default_kind: DeviceKind,
    quirks: Vec<Quirk>,
}

impl FileDeviceRegistry {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, default_kind: DeviceKind, quirks: Vec<Quirk>) -> Self {
        Self {
            path: path.into(),
            default_kind,
            quirks,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn attach_quirks(&self, mut devices: Vec<Device>) -> Vec<Device> {
        for device in &mut devices {
            device.hooks.extend(
                self.quirks
                    .iter()
                    .filter(|quirk| quirk.address == device.address)
                    .map(|quirk| quirk.hook),
            );
        }
        devices
    }
}

impl DeviceRegistry for FileDeviceRegistry {
    fn load(&self) -> impl Future<Output = Result<Vec<Device>, PorchlightError>> + Send {
        async move {
            let content = match tokio::fs::read_to_string(&self.path).await {
                Ok(content) => content,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    tracing::error!(path = %self.path.display(), "device registry not found, no devices loaded");
                    return Ok(Vec::new());
                }
                Err(source) => {
                    return Err(RegistryError {
                        path: self.path.clone(),
                        source,
                    }
                    .into());
                }
            };

            let parsed = registry::parse(&content, self.default_kind);
            for issue in &parsed.issues {
                tracing::warn!(path = %self.path.display(), %issue, "skipping registry entry");
            }
            Ok(self.attach_quirks(parsed.devices))
        }
    }
}
