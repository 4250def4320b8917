//! App - アプリケーション層
//!
//! ports と operator を組み合わせて、ホスト側の実行ロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **Runtime**: envelope → operator の実行

pub mod builder;
pub mod runtime;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::runtime::Runtime;
