//! AnalyticsClient port - Segment への track 呼び出し

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{BeaconError, Properties, SegmentCredentials};

/// AnalyticsClient は 1 回の track を 1 回のネットワーク呼び出しで送る
///
/// バッチ・リトライは行わない。失敗はそのまま呼び出し元へ返す。
#[async_trait]
pub trait AnalyticsClient: Send + Sync {
    async fn track(
        &self,
        user_id: &str,
        event: &str,
        properties: &Properties,
    ) -> Result<(), BeaconError>;
}

/// 解決済みの credentials と debug フラグから client を組み立てる
pub trait AnalyticsClientFactory: Send + Sync {
    fn build(
        &self,
        credentials: SegmentCredentials,
        debug: bool,
    ) -> Result<Arc<dyn AnalyticsClient>, BeaconError>;
}
