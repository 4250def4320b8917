//! CredentialResolver の実装
//!
//! - **EnvCredentialResolver**: `BEACON_CONN_<ID>` 環境変数（JSON）
//! - **StaticCredentialResolver**: 設定ファイル由来の connection
//! - **ChainedCredentialResolver**: 上記を順に試す

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{BeaconError, Connection, ConnectionId};
use crate::ports::CredentialResolver;

pub const ENV_CONN_PREFIX: &str = "BEACON_CONN_";

/// 環境変数から connection を解決する
///
/// 変数名は `BEACON_CONN_` + 大文字化した conn_id（英数字以外は `_`）。
/// そのため `segment-prod` / `segment.prod` / `segment_prod` は同じ変数
/// `BEACON_CONN_SEGMENT_PROD` を指す（意図した挙動）。
/// 値は `Connection` の JSON ドキュメント。
/// 構築時に環境をスナップショットするので、実行中の env 変更は見ない。
pub struct EnvCredentialResolver {
    vars: HashMap<String, String>,
}

impl EnvCredentialResolver {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(ENV_CONN_PREFIX))
            .collect();
        Self { vars }
    }

    pub fn var_name(conn_id: &ConnectionId) -> String {
        let suffix: String = conn_id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{ENV_CONN_PREFIX}{suffix}")
    }
}

#[async_trait]
impl CredentialResolver for EnvCredentialResolver {
    async fn resolve(&self, conn_id: &ConnectionId, debug: bool) -> Result<Connection, BeaconError> {
        let name = Self::var_name(conn_id);
        let Some(raw) = self.vars.get(&name) else {
            return Err(BeaconError::ConnectionNotFound(conn_id.clone()));
        };
        if debug {
            debug!(conn_id = %conn_id, var = %name, "connection resolved from environment");
        }

        let mut conn: Connection =
            serde_json::from_str(raw).map_err(|e| BeaconError::InvalidConnection {
                conn_id: conn_id.clone(),
                reason: format!("{name} is not a valid connection document: {e}"),
            })?;
        conn.conn_id.get_or_insert_with(|| conn_id.clone());
        Ok(conn)
    }
}

/// 設定ファイルなどで事前に与えられた connection の集合
///
/// `config` はテーブルのキーを小文字にするので、conn_id は小文字に揃えて比較する。
#[derive(Default)]
pub struct StaticCredentialResolver {
    connections: HashMap<ConnectionId, Connection>,
}

impl StaticCredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection(mut self, conn_id: ConnectionId, mut conn: Connection) -> Self {
        conn.conn_id = Some(conn_id.clone());
        self.connections.insert(Self::key(&conn_id), conn);
        self
    }

    fn key(conn_id: &ConnectionId) -> ConnectionId {
        ConnectionId::new(conn_id.as_str().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl FromIterator<(ConnectionId, Connection)> for StaticCredentialResolver {
    fn from_iter<T: IntoIterator<Item = (ConnectionId, Connection)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |acc, (id, conn)| acc.with_connection(id, conn))
    }
}

#[async_trait]
impl CredentialResolver for StaticCredentialResolver {
    async fn resolve(&self, conn_id: &ConnectionId, debug: bool) -> Result<Connection, BeaconError> {
        let conn = self
            .connections
            .get(&Self::key(conn_id))
            .cloned()
            .ok_or_else(|| BeaconError::ConnectionNotFound(conn_id.clone()))?;
        if debug {
            debug!(conn_id = %conn_id, "connection resolved from configuration");
        }
        Ok(conn)
    }
}

/// 複数の resolver を順に試す
///
/// `ConnectionNotFound` のときだけ次へ進む。それ以外のエラーは即座に返す。
#[derive(Default)]
pub struct ChainedCredentialResolver {
    resolvers: Vec<Arc<dyn CredentialResolver>>,
}

impl ChainedCredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }
}

#[async_trait]
impl CredentialResolver for ChainedCredentialResolver {
    async fn resolve(&self, conn_id: &ConnectionId, debug: bool) -> Result<Connection, BeaconError> {
        for resolver in &self.resolvers {
            match resolver.resolve(conn_id, debug).await {
                Err(BeaconError::ConnectionNotFound(_)) => continue,
                other => return other,
            }
        }
        Err(BeaconError::ConnectionNotFound(conn_id.clone()))
    }
}
