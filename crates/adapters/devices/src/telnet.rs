//! Telnet servo transport: one command line out, one line back.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use porchlight_app::ports::{DeviceTransport, TransportError};
use porchlight_domain::device::Device;
use porchlight_domain::intent::Intent;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Drives servo fixtures that accept `0`/`180` on a raw TCP line protocol.
#[derive(Debug, Clone)]
pub struct TelnetTransport {
    port: u16,
    timeout: Duration,
}

impl TelnetTransport {
    #[must_use]
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    async fn exchange(&self, target: SocketAddr, command: &str) -> Result<String, TransportError> {
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(target))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))??;
        let (reader, mut writer) = stream.into_split();

        writer.write_all(format!("{command}\n").as_bytes()).await?;
        writer.flush().await?;

        let mut line = String::new();
        tokio::time::timeout(self.timeout, BufReader::new(reader).read_line(&mut line))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))??;

        Ok(line.trim().to_string())
    }
}

impl DeviceTransport for TelnetTransport {
    fn send(
        &self,
        device: &Device,
        intent: Intent,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        let target = SocketAddr::new(device.address, self.port);
        async move {
            let command = intent.servo_position();
            let response = self.exchange(target, command).await?;
            tracing::info!(%target, command, %response, "telnet command answered");
            Ok(response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use porchlight_domain::device::DeviceKind;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn servo(port: u16) -> (TelnetTransport, Device) {
        let device = Device::builder()
            .name("Hall")
            .address("127.0.0.1".parse().unwrap())
            .kind(DeviceKind::TelnetServo)
            .build()
            .unwrap();
        (TelnetTransport::new(port, Duration::from_millis(500)), device)
    }

    #[tokio::test]
    async fn should_write_servo_position_and_return_reply_line() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = socket.into_split();
            let mut line = String::new();
            BufReader::new(reader).read_line(&mut line).await.unwrap();
            writer.write_all(b"moved to 180\r\n").await.unwrap();
            line
        });
        let (transport, device) = servo(port);

        let response = transport.send(&device, Intent::Off).await.unwrap();

        assert_eq!(response, "moved to 180");
        assert_eq!(server.await.unwrap(), "180\n");
    }

    #[tokio::test]
    async fn should_time_out_when_device_never_answers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let _ = socket.read_to_end(&mut buf).await;
        });
        let (transport, device) = servo(port);

        let result = transport.send(&device, Intent::On).await;

        assert!(matches!(result, Err(TransportError::Timeout(_))));
        server.abort();
    }

    #[tokio::test]
    async fn should_fail_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let (transport, device) = servo(port);

        let result = transport.send(&device, Intent::On).await;

        assert!(matches!(result, Err(TransportError::Io(_))));
    }
}
