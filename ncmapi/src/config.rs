//! Client and gateway configuration, persisted as JSON.
//!
//! The config file lives at `~/.config/ncmapi/config.json` (platform config
//! directory via `dirs`) and looks like:
//!
//! ```json
//! {
//!   "host": "localhost",
//!   "port": 3000,
//!   "server_command": ["node", "app.js"],
//!   "raise_for_status": true,
//!   "add_timestamp": false,
//!   "timeout_secs": 30,
//!   "ready_timeout_secs": 10
//! }
//! ```
//!
//! Every field is optional. `NCMAPI_HOST` and `NCMAPI_PORT` override the file.

use crate::error::{NcmApiError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;

/// Settings shared by the supervisor and the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Address the gateway binds to and the client connects to.
    pub host: String,
    pub port: u16,
    /// Command line used to start the gateway.
    pub server_command: Vec<String>,
    /// Turn non-2xx responses into [`NcmApiError::HttpStatus`].
    pub raise_for_status: bool,
    /// Add a `timestamp` argument to every call.
    pub add_timestamp: bool,
    /// Default per-request timeout. `None` keeps reqwest's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// How long [`Gateway`](crate::Gateway) waits for the port to open.
    /// `None` skips the wait.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            server_command: vec!["node".to_owned(), "app.js".to_owned()],
            raise_for_status: true,
            add_timestamp: false,
            timeout_secs: None,
            ready_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Load from the default location, then apply environment overrides.
    ///
    /// Returns defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from an explicit path. No environment overrides are applied.
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save to the default location, creating parent directories if needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// `http://{host}:{port}`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        self.ready_timeout_secs.map(Duration::from_secs)
    }

    pub fn path() -> Result<PathBuf> {
        let config = dirs::config_dir()
            .ok_or_else(|| NcmApiError::Other("cannot determine config directory".into()))?;
        Ok(config.join("ncmapi").join("config.json"))
    }

    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("NCMAPI_HOST") {
            if !host.is_empty() {
                self.host = host;
            }
        }
        if let Some(port) = std::env::var("NCMAPI_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_gateway_defaults() {
        let c = ApiConfig::default();
        assert_eq!(c.base_url(), "http://localhost:3000");
        assert!(c.raise_for_status);
        assert!(!c.add_timestamp);
        assert_eq!(c.timeout(), None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let c: ApiConfig = serde_json::from_str(r#"{ "port": 4000, "timeout_secs": 5 }"#).unwrap();
        assert_eq!(c.port, 4000);
        assert_eq!(c.host, DEFAULT_HOST);
        assert_eq!(c.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(c.server_command, ["node", "app.js"]);
    }

    #[test]
    fn save_then_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let c = ApiConfig {
            host: "127.0.0.1".into(),
            port: 3456,
            add_timestamp: true,
            ready_timeout_secs: Some(3),
            ..ApiConfig::default()
        };
        c.save_to(&path).unwrap();
        assert_eq!(ApiConfig::load_from(&path).unwrap(), c);
    }
}
