//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **SegmentClientFactory / SegmentHttpClient**: 本番用の Segment HTTP client
//! - **RecordingClientFactory**: 送信せず記録するだけの client（dry-run・テスト用）
//! - **EnvCredentialResolver / StaticCredentialResolver / ChainedCredentialResolver**
//! - **ContextTemplateRenderer**: `{{ name }}` 置換

pub mod credentials;
pub mod recording;
pub mod segment_http;
pub mod template;

// 主要な型を再エクスポート
pub use self::credentials::{ChainedCredentialResolver, EnvCredentialResolver, StaticCredentialResolver};
pub use self::recording::{RecordingAnalyticsClient, RecordingClientFactory};
pub use self::segment_http::{SegmentClientFactory, SegmentHttpClient};
pub use self::template::ContextTemplateRenderer;
