//! Settings file of the `posbridge` binary.

use anyhow::{Context, Result};
use posbridge_network::RpcServerConfig;
use posbridge_session::BridgeConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable overriding `server.bind_addr`.
pub const BIND_ENV: &str = "POSBRIDGE_BIND";

/// Top-level settings, read from an optional JSON file.
///
/// ```json
/// {
///   "bridge": { "queue_capacity": 32, "scan": { "timeout": 15000 } },
///   "server": { "bind_addr": "0.0.0.0:7100" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bridge: BridgeConfig,
    pub server: RpcServerConfig,
}

impl Settings {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply a bind address override, as given in [`BIND_ENV`].
    pub fn with_bind_override(mut self, bind: Option<&str>) -> Result<Self> {
        if let Some(bind) = bind {
            self.server.bind_addr = bind
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid {BIND_ENV} address: {bind}"))?;
        }
        Ok(self)
    }
}
