//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `porchlight.toml` in the working directory, or the file named by
//! `PORCHLIGHT_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use porchlight_adapter_devices::{Quirk, TransportConfig};
use porchlight_adapter_transcript::Target;
use porchlight_app::services::dispatcher::{DispatchPolicy, RetryPolicy};
use porchlight_domain::device::{DeviceHook, DeviceKind};
use serde::Deserialize;

const DEFAULT_PATH: &str = "porchlight.toml";
const MAX_TIMEOUT_MS: u64 = 5000;
const MAX_RETRIES: u32 = 10;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Device registry file.
    pub registry: RegistryConfig,
    /// Retry and pacing of device commands.
    pub dispatch: DispatchConfig,
    /// Wire-level transport settings.
    pub transports: TransportsConfig,
    /// Per-device post-action behaviour, keyed by address.
    pub quirks: Vec<QuirkConfig>,
    /// Voice transcript watcher.
    pub transcript: TranscriptConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Directory of dashboard assets served for unmatched paths.
    pub static_dir: Option<PathBuf>,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Device registry configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path of the `name - address` registry file.
    pub path: PathBuf,
    /// Kind of devices with neither a `$` prefix nor an explicit kind.
    pub default_kind: DeviceKind,
}

/// Bounded retry for one device kind.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// At most 10.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Dispatch configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Pause after each device during a fan-out.
    pub fan_out_delay_ms: u64,
    pub smart_plug: RetryConfig,
    pub direct_http: RetryConfig,
    pub telnet: RetryConfig,
}

/// Transport configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TransportsConfig {
    /// Bound on every network operation, at most 5000.
    pub timeout_ms: u64,
    /// Smart-plug control tool.
    pub plug_command: String,
    pub http_control_path: String,
    pub http_port: Option<u16>,
    pub telnet_port: u16,
}

/// A device quirk.
#[derive(Debug, Deserialize)]
pub struct QuirkConfig {
    /// Address of the affected device.
    pub address: String,
    /// Switch the device back on this many milliseconds after an OFF.
    pub reassert_on_after_ms: u64,
}

/// Transcript watcher configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    pub enabled: bool,
    /// File the speech recogniser appends to.
    pub path: PathBuf,
    pub poll_interval_ms: u64,
    /// `all` or a single device address.
    pub target: Target,
}

impl Config {
    /// Load configuration from `porchlight.toml` (or `PORCHLIGHT_CONFIG`, if
    /// set) then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PORCHLIGHT_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PORCHLIGHT_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("PORCHLIGHT_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("PORCHLIGHT_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("PORCHLIGHT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("PORCHLIGHT_REGISTRY") {
            self.registry.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("PORCHLIGHT_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.transports.timeout_ms == 0 || self.transports.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Validation(format!(
                "transports.timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.transcript.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "transcript.poll_interval_ms must be non-zero".to_string(),
            ));
        }
        for (kind, retry) in [
            ("smart_plug", &self.dispatch.smart_plug),
            ("direct_http", &self.dispatch.direct_http),
            ("telnet", &self.dispatch.telnet),
        ] {
            if retry.max_retries > MAX_RETRIES {
                return Err(ConfigError::Validation(format!(
                    "dispatch.{kind}.max_retries must be at most {MAX_RETRIES}"
                )));
            }
        }
        self.quirks()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Per-kind retry and fan-out pacing for the dispatcher.
    #[must_use]
    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            smart_plug: self.dispatch.smart_plug.policy(),
            direct_http: self.dispatch.direct_http.policy(),
            telnet_servo: self.dispatch.telnet.policy(),
            fan_out_delay: Duration::from_millis(self.dispatch.fan_out_delay_ms),
        }
    }

    /// Shared settings for every device transport.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_millis(self.transports.timeout_ms),
            plug_command: self.transports.plug_command.clone(),
            http_control_path: self.transports.http_control_path.clone(),
            http_port: self.transports.http_port,
            telnet_port: self.transports.telnet_port,
        }
    }

    /// Configured quirks as registry hooks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a quirk address is not an IP address.
    pub fn quirks(&self) -> Result<Vec<Quirk>, ConfigError> {
        self.quirks
            .iter()
            .map(|quirk| {
                let address: IpAddr = quirk.address.trim().parse().map_err(|_| {
                    ConfigError::Validation(format!("invalid quirk address {:?}", quirk.address))
                })?;
                Ok(Quirk {
                    address,
                    hook: DeviceHook::ReassertOn {
                        after_ms: quirk.reassert_on_after_ms,
                    },
                })
            })
            .collect()
    }
}

impl RetryConfig {
    fn policy(self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5069,
            static_dir: Some(PathBuf::from("static")),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:porchlight.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "porchlightd=info,porchlight=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("devices.txt"),
            default_kind: DeviceKind::TelnetServo,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fan_out_delay_ms: 500,
            smart_plug: RetryConfig::default(),
            direct_http: RetryConfig::default(),
            telnet: RetryConfig {
                max_retries: 0,
                ..RetryConfig::default()
            },
        }
    }
}

impl Default for TransportsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: MAX_TIMEOUT_MS,
            plug_command: "kasa".to_string(),
            http_control_path: "/servo".to_string(),
            http_port: None,
            telnet_port: 23,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("transcription.txt"),
            poll_interval_ms: 1000,
            target: Target::All,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
