//! CredentialResolver port - connection_id から接続設定を解決

use async_trait::async_trait;

use crate::domain::{BeaconError, Connection, ConnectionId};

/// CredentialResolver は名前付き connection を引く
///
/// 未知の connection_id は `BeaconError::ConnectionNotFound` を返すこと。
/// `ChainedCredentialResolver` はこのエラーだけを「次を試す」合図として扱います。
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, conn_id: &ConnectionId, debug: bool) -> Result<Connection, BeaconError>;
}
