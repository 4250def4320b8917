//! Connection - 名前付きの接続設定と Segment 認証情報
//!
//! Connection はホスト側（環境変数 / 設定ファイル）に保存され、
//! 実行時に `ConnectionId` で引かれます。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::BeaconError;

/// Default connection name used when a task does not specify one.
pub const DEFAULT_CONNECTION_ID: &str = "segment_default";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTION_ID)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stored connection document.
///
/// 例（JSON）:
/// ```json
/// { "conn_type": "segment", "extra": { "write_key": "abc" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Filled in by the resolver when the stored document omits it.
    #[serde(default)]
    pub conn_id: Option<ConnectionId>,

    #[serde(default)]
    pub conn_type: Option<String>,

    /// Overrides the client's default endpoint when set.
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Connection {
    pub fn new(conn_id: ConnectionId) -> Self {
        Self {
            conn_id: Some(conn_id),
            conn_type: None,
            host: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Extract the Segment credentials (`extra.write_key`).
    pub fn segment_credentials(&self) -> Result<SegmentCredentials, BeaconError> {
        let write_key = self
            .extra
            .get("write_key")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BeaconError::InvalidConnection {
                conn_id: self.conn_id.clone().unwrap_or_default(),
                reason: "No write_key provided".to_string(),
            })?;

        Ok(SegmentCredentials {
            write_key: write_key.to_string(),
            endpoint: self.host.clone().filter(|h| !h.is_empty()),
        })
    }
}

/// Session credentials needed to reach the Segment endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct SegmentCredentials {
    pub write_key: String,
    pub endpoint: Option<String>,
}

// write_key はログに出さない
impl fmt::Debug for SegmentCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentCredentials")
            .field("write_key", &"***")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
