//! Client configuration

use crate::error::{ClientError, ClientResult};
use dsync_protocol::{DEFAULT_PORT, MAX_FRAME_LEN};
use serde::Deserialize;
use std::path::Path;

/// Where the controller lives and how the session reads from it.
///
/// ```toml
/// host = "192.168.10.2"
/// port = 23883
/// max_frame_len = 65536
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Controller host name or address
    pub host: String,
    /// Controller port
    pub port: u16,
    /// Largest frame accepted before the session fails
    pub max_frame_len: usize,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn from_toml_str(s: &str) -> ClientResult<Self> {
        let config: ClientConfig = toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.host.is_empty() {
            return Err(ClientError::Config("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ClientError::Config("port must not be 0".into()));
        }
        if self.max_frame_len == 0 {
            return Err(ClientError::Config("max_frame_len must not be 0".into()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_frame_len: MAX_FRAME_LEN,
        }
    }
}
