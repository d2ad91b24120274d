//! Kind-routing transport.

use std::future::Future;

use porchlight_app::ports::{DeviceTransport, TransportError};
use porchlight_domain::device::{Device, DeviceKind};
use porchlight_domain::intent::Intent;

use crate::config::TransportConfig;
use crate::http::HttpTransport;
use crate::plug::PlugTransport;
use crate::telnet::TelnetTransport;

/// One transport per device kind; each send goes to the one matching the
/// device.
#[derive(Debug, Clone)]
pub struct DeviceTransports {
    http: HttpTransport,
    telnet: TelnetTransport,
    plug: PlugTransport,
}

impl DeviceTransports {
    /// Build every transport from shared settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        Ok(Self {
            http: HttpTransport::new(
                config.http_control_path.clone(),
                config.http_port,
                config.timeout,
            )?,
            telnet: TelnetTransport::new(config.telnet_port, config.timeout),
            plug: PlugTransport::new(config.plug_command.clone(), config.timeout),
        })
    }
}

impl DeviceTransport for DeviceTransports {
    fn send(
        &self,
        device: &Device,
        intent: Intent,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        async move {
            match device.kind {
                DeviceKind::DirectHttp => self.http.send(device, intent).await,
                DeviceKind::TelnetServo => self.telnet.send(device, intent).await,
                DeviceKind::SmartPlug => self.plug.send(device, intent).await,
            }
        }
    }
}
