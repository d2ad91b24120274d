//! Direct HTTP transport for fixtures exposing a JSON control endpoint.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use porchlight_app::ports::{DeviceTransport, TransportError};
use porchlight_domain::device::Device;
use porchlight_domain::intent::Intent;
use serde::Serialize;

#[derive(Serialize)]
struct ControlRequest<'a> {
    command: &'a str,
}

/// POSTs `{"command": "0"|"180"}` to `http://<address>[:port]<control_path>`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    control_path: String,
    port: Option<u16>,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport whose requests are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the HTTP client cannot be built.
    pub fn new(
        control_path: impl Into<String>,
        port: Option<u16>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|err| TransportError::Request(Box::new(err)))?;
        Ok(Self {
            client,
            control_path: control_path.into(),
            port,
            timeout,
        })
    }

    fn url_for(&self, address: IpAddr) -> String {
        let authority = match (address, self.port) {
            (address, Some(port)) => SocketAddr::new(address, port).to_string(),
            (IpAddr::V4(v4), None) => v4.to_string(),
            (IpAddr::V6(v6), None) => format!("[{v6}]"),
        };
        let path = self.control_path.trim_start_matches('/');
        format!("http://{authority}/{path}")
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Request(Box::new(err))
        }
    }
}

/// JSON bodies are surfaced compactly; a bare JSON string is unwrapped.
fn describe_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(text)) => text,
        Ok(value) => value.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

impl DeviceTransport for HttpTransport {
    fn send(
        &self,
        device: &Device,
        intent: Intent,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        let url = self.url_for(device.address);
        async move {
            let command = intent.servo_position();
            let response = self
                .client
                .post(&url)
                .json(&ControlRequest { command })
                .send()
                .await
                .map_err(|err| self.classify(err))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status(status.as_u16()));
            }

            let body = response.text().await.map_err(|err| self.classify(err))?;
            let described = describe_body(&body);
            tracing::info!(%url, command, response = %described, "http command answered");
            Ok(described)
        }
    }
}
