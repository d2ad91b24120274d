//! Command dispatcher — turns an intent into delivered device commands.
//!
//! Retries follow a per-kind [`RetryPolicy`]: `attempts = max_retries + 1`,
//! with `retry_delay` between consecutive attempts. After a successful
//! delivery the device's hooks run in declaration order. Fan-out walks the
//! registry in order and pauses `fan_out_delay` after every device so shared
//! network gear is not flooded.

use std::net::IpAddr;
use std::time::Duration;

use porchlight_domain::device::{Device, DeviceKind};
use porchlight_domain::dispatch::{DeviceOutcome, FanOutReport};
use porchlight_domain::error::{DispatchError, NotFoundError, PorchlightError};
use porchlight_domain::intent::Intent;

use crate::ports::{DeviceRegistry, DeviceTransport};

/// Bounded retry for one device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry.
    pub const NONE: Self = Self {
        max_retries: 0,
        retry_delay: Duration::ZERO,
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Retry and pacing settings for the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    pub smart_plug: RetryPolicy,
    pub direct_http: RetryPolicy,
    pub telnet_servo: RetryPolicy,
    /// Pause after each device during a fan-out.
    pub fan_out_delay: Duration,
}

impl DispatchPolicy {
    #[must_use]
    pub fn retry_for(&self, kind: DeviceKind) -> RetryPolicy {
        match kind {
            DeviceKind::SmartPlug => self.smart_plug,
            DeviceKind::DirectHttp => self.direct_http,
            DeviceKind::TelnetServo => self.telnet_servo,
        }
    }
}

impl Default for DispatchPolicy {
    /// Telnet fixtures get a single attempt, matching how they have always
    /// been driven; the other kinds retry three times a second apart.
    fn default() -> Self {
        Self {
            smart_plug: RetryPolicy::default(),
            direct_http: RetryPolicy::default(),
            telnet_servo: RetryPolicy::NONE,
            fan_out_delay: Duration::from_millis(500),
        }
    }
}

/// Delivers intents to devices from the registry.
pub struct CommandDispatcher<G, T> {
    registry: G,
    transport: T,
    policy: DispatchPolicy,
}

impl<G, T> CommandDispatcher<G, T>
where
    G: DeviceRegistry + Sync,
    T: DeviceTransport + Sync,
{
    /// Create a dispatcher over the given registry and transport.
    pub fn new(registry: G, transport: T, policy: DispatchPolicy) -> Self {
        Self {
            registry,
            transport,
            policy,
        }
    }

    /// List registered devices.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be read.
    pub async fn list_devices(&self) -> Result<Vec<Device>, PorchlightError> {
        self.registry.load().await
    }

    /// Send `intent` to `device`, retrying per its kind, then run its hooks.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] with the last transport error once every
    /// attempt failed, or when a hook's follow-up command fails.
    #[tracing::instrument(skip(self, device), fields(device = %device.name, address = %device.address, kind = %device.kind))]
    pub async fn dispatch(&self, device: &Device, intent: Intent) -> Result<String, DispatchError> {
        let retry = self.policy.retry_for(device.kind);
        let response = self.send_with_retry(device, intent, retry).await?;

        for hook in &device.hooks {
            let Some((delay, follow_up)) = hook.follow_up(intent) else {
                continue;
            };
            tokio::time::sleep(delay).await;
            tracing::info!(%follow_up, "running post-action hook");
            self.transport
                .send(device, follow_up)
                .await
                .map_err(|err| DispatchError {
                    device: device.name.clone(),
                    attempts: 1,
                    detail: format!("hook {follow_up} failed: {err}"),
                })?;
        }

        Ok(response)
    }

    async fn send_with_retry(
        &self,
        device: &Device,
        intent: Intent,
        retry: RetryPolicy,
    ) -> Result<String, DispatchError> {
        let attempts = retry.max_retries.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.transport.send(device, intent).await {
                Ok(response) => {
                    tracing::info!(%intent, attempt, %response, "command delivered");
                    return Ok(response);
                }
                Err(err) => {
                    tracing::warn!(%intent, attempt, attempts, error = %err, "command failed");
                    last_error = err.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(retry.retry_delay).await;
                    }
                }
            }
        }

        tracing::error!(%intent, attempts, error = %last_error, "giving up on device");
        Err(DispatchError {
            device: device.name.clone(),
            attempts,
            detail: last_error,
        })
    }

    /// Send `intent` to the registered device at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`PorchlightError::NotFound`] when no device has that address,
    /// or [`PorchlightError::Dispatch`] when delivery fails.
    pub async fn dispatch_address(
        &self,
        address: IpAddr,
        intent: Intent,
    ) -> Result<String, PorchlightError> {
        let devices = self.registry.load().await?;
        let device = devices
            .into_iter()
            .find(|d| d.address == address)
            .ok_or_else(|| NotFoundError {
                entity: "Device",
                id: address.to_string(),
            })?;
        Ok(self.dispatch(&device, intent).await?)
    }

    /// Send `intent` to every registered device and aggregate the results.
    ///
    /// Individual failures never abort the fan-out; they are recorded in the
    /// returned report.
    ///
    /// # Errors
    ///
    /// Returns an error only if the registry cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn dispatch_all(&self, intent: Intent) -> Result<FanOutReport, PorchlightError> {
        let devices = self.registry.load().await?;
        let mut outcomes = Vec::with_capacity(devices.len());

        for device in &devices {
            let outcome = match self.dispatch(device, intent).await {
                Ok(response) => DeviceOutcome::succeeded(&device.name, device.address, response),
                Err(err) => DeviceOutcome::failed(&device.name, device.address, err.to_string()),
            };
            outcomes.push(outcome);
            tokio::time::sleep(self.policy.fan_out_delay).await;
        }

        let report = FanOutReport { intent, outcomes };
        match report.failure_summary() {
            None => tracing::info!(devices = devices.len(), "fan-out complete"),
            Some(summary) => tracing::warn!(%summary, "fan-out finished with failures"),
        }
        Ok(report)
    }
}
