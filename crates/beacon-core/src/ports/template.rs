//! TemplateRenderer port - templated field のレンダリング

use crate::domain::{BeaconError, TaskContext};

/// TemplateRenderer は 1 つの文字列テンプレートを context で展開する
///
/// `field` はエラーメッセージ用（どのフィールドで失敗したか）。
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, field: &str, template: &str, ctx: &TaskContext) -> Result<String, BeaconError>;
}
