//! Configuration - `beacon.toml` + `BEACON__*` 環境変数
//!
//! ```toml
//! [segment]
//! endpoint = "https://api.segment.io"
//! timeout_secs = 10
//!
//! [logging]
//! level = "info"
//!
//! [connections.segment_default.extra]
//! write_key = "..."
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::domain::{BeaconError, Connection, ConnectionId};
use crate::impls::StaticCredentialResolver;
use crate::impls::segment_http::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeaconConfig {
    #[serde(default)]
    pub segment: SegmentSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub connections: HashMap<String, Connection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_level() -> String {
    "info".to_string()
}

impl BeaconConfig {
    /// 設定を読み込む
    ///
    /// `path` が無ければカレントディレクトリの `beacon.*` を任意で読む。
    /// 環境変数 `BEACON__SEGMENT__ENDPOINT` などが最後に上書きする。
    pub fn load(path: Option<&Path>) -> Result<Self, BeaconError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name("beacon").required(false),
        };
        let cfg = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("BEACON")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, BeaconError> {
        let cfg = Config::builder()
            .add_source(File::from_str(s, FileFormat::Toml))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.segment.timeout_secs)
    }

    pub fn static_resolver(&self) -> StaticCredentialResolver {
        self.connections
            .iter()
            .map(|(id, conn)| (ConnectionId::new(id.as_str()), conn.clone()))
            .collect()
    }
}
