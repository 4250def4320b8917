//! SegmentHook - connection_id と debug フラグから client を組み立てる

use std::sync::Arc;

use crate::domain::{BeaconError, ConnectionId, Properties};
use crate::ports::{AnalyticsClient, AnalyticsClientFactory, CredentialResolver};

#[derive(Debug, Clone)]
pub struct SegmentHook {
    conn_id: ConnectionId,
    debug_mode: bool,
}

impl SegmentHook {
    pub fn new(conn_id: ConnectionId, debug_mode: bool) -> Self {
        Self { conn_id, debug_mode }
    }

    pub fn conn_id(&self) -> &ConnectionId {
        &self.conn_id
    }

    /// connection を解決して client を作る
    ///
    /// 解決に失敗した場合は client を作らずにエラーを返す。
    pub async fn get_conn(
        &self,
        resolver: &dyn CredentialResolver,
        factory: &dyn AnalyticsClientFactory,
    ) -> Result<Arc<dyn AnalyticsClient>, BeaconError> {
        let conn = resolver.resolve(&self.conn_id, self.debug_mode).await?;
        let credentials = conn.segment_credentials()?;
        factory.build(credentials, self.debug_mode)
    }

    pub async fn track(
        &self,
        resolver: &dyn CredentialResolver,
        factory: &dyn AnalyticsClientFactory,
        user_id: &str,
        event: &str,
        properties: &Properties,
    ) -> Result<(), BeaconError> {
        self.get_conn(resolver, factory)
            .await?
            .track(user_id, event, properties)
            .await
    }
}
