use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::net::socket::ConnectionConfig;
use crate::reactor::ReactorConfig;

/// Server settings, read from YAML. Every field has a default so a partial
/// (or empty) file is valid. Unknown keys are rejected. The document root
/// only comes from the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub reactor: ReactorSettings,
    pub connection: ConnectionSettings,
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReactorSettings {
    pub tick_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionSettings {
    pub io_timeout_ms: u64,
    pub read_chunk: usize,
    pub write_chunk: usize,
    pub max_frame_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            reactor: ReactorSettings::default(),
            connection: ConnectionSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for ReactorSettings {
    fn default() -> Self {
        Self { tick_ms: 1000 }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        let defaults = ConnectionConfig::default();
        Self {
            io_timeout_ms: defaults.io_timeout.as_millis() as u64,
            read_chunk: defaults.read_chunk,
            write_chunk: defaults.write_chunk,
            max_frame_bytes: defaults.max_frame_bytes,
        }
    }
}

impl Config {
    /// Defaults, with the listen address taken from `LISTEN` when set.
    pub fn load() -> Self {
        Self::default().with_env_overrides()
    }

    /// Reads a YAML file, then applies the `LISTEN` override.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {} failed", path.display()))?;
        let config = Self::from_yaml_str(&raw)
            .with_context(|| format!("parsing config file {} failed", path.display()))?;
        Ok(config.with_env_overrides())
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        // serde_yaml rejects an empty document; treat it as all defaults.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(listen_addr) = std::env::var("LISTEN") {
            self.server.listen_addr = listen_addr;
        }
        self
    }

    /// The configured listen address with its port replaced by `port`.
    pub fn listen_on(&self, port: u16) -> anyhow::Result<SocketAddr> {
        let mut addr: SocketAddr = self
            .server
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address {:?}", self.server.listen_addr))?;
        addr.set_port(port);
        Ok(addr)
    }

    pub fn max_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid log level {:?}", self.log_level))
    }

    pub fn reactor_config(&self) -> ReactorConfig {
        ReactorConfig {
            tick: Duration::from_millis(self.reactor.tick_ms),
        }
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            io_timeout: Duration::from_millis(self.connection.io_timeout_ms),
            read_chunk: self.connection.read_chunk,
            write_chunk: self.connection.write_chunk,
            max_frame_bytes: self.connection.max_frame_bytes,
        }
    }
}
