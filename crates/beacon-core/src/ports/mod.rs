//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（接続設定の保存先, Segment API, テンプレートエンジン）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod analytics;
pub mod clock;
pub mod credentials;
pub mod id_generator;
pub mod template;

// 主要な trait を再エクスポート
pub use self::analytics::{AnalyticsClient, AnalyticsClientFactory};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::credentials::CredentialResolver;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::template::TemplateRenderer;
