//! Smart-plug transport backed by the plug vendor's command-line tool.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use porchlight_app::ports::{DeviceTransport, TransportError};
use porchlight_domain::device::Device;
use porchlight_domain::intent::Intent;
use tokio::process::Command;

/// Runs `<program> --host <address> on|off` and treats a zero exit as success.
#[derive(Debug, Clone)]
pub struct PlugTransport {
    program: String,
    timeout: Duration,
}

impl PlugTransport {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl DeviceTransport for PlugTransport {
    fn send(
        &self,
        device: &Device,
        intent: Intent,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        let address = device.address.to_string();
        async move {
            let action = intent.plug_action();
            let mut command = Command::new(&self.program);
            command
                .arg("--host")
                .arg(&address)
                .arg(action)
                .stdin(Stdio::null())
                .kill_on_drop(true);

            let output = tokio::time::timeout(self.timeout, command.output())
                .await
                .map_err(|_| TransportError::Timeout(self.timeout))??;

            if !output.status.success() {
                return Err(TransportError::CommandFailed {
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }

            tracing::info!(%address, action, "smart plug switched");
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if stdout.is_empty() {
                Ok(format!("plug {action}"))
            } else {
                Ok(stdout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use porchlight_domain::device::DeviceKind;

    fn plug() -> Device {
        Device::builder()
            .name("Lamp")
            .address("10.0.0.12".parse().unwrap())
            .kind(DeviceKind::SmartPlug)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_pass_host_and_action_to_tool() {
        let transport = PlugTransport::new("echo", Duration::from_secs(5));

        let response = transport.send(&plug(), Intent::Off).await.unwrap();

        assert_eq!(response, "--host 10.0.0.12 off");
    }

    #[tokio::test]
    async fn should_fail_when_tool_exits_non_zero() {
        let transport = PlugTransport::new("false", Duration::from_secs(5));

        let result = transport.send(&plug(), Intent::On).await;

        assert!(matches!(result, Err(TransportError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn should_fail_when_tool_is_missing() {
        let transport = PlugTransport::new("porchlight-no-such-tool", Duration::from_secs(5));

        let result = transport.send(&plug(), Intent::On).await;

        assert!(matches!(result, Err(TransportError::Io(_))));
    }
}
