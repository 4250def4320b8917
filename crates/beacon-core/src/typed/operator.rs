//! Operator trait - スケジュール可能な作業単位の契約
//!
//! # 契約
//! - `TYPE`: task_type（envelope との対応付け）
//! - `TEMPLATE_FIELDS`: 実行前にホストがレンダリングするフィールド
//! - `UI_COLOR`: UI 表示用の色
//! - `execute`: 1 回の scheduled run につき 1 回だけ呼ばれる

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::context::ExecutionContext;
use crate::domain::{BeaconError, TaskContext};
use crate::ports::TemplateRenderer;

/// Operator は task_type と設定レコードの型を対応付ける
///
/// # 使用例
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct MyOperator {
///     message: String,
/// }
///
/// #[async_trait]
/// impl Operator for MyOperator {
///     const TYPE: &'static str = "my_namespace.my_operator.v1";
///     const TEMPLATE_FIELDS: &'static [&'static str] = &["message"];
///     const UI_COLOR: &'static str = "#ffffff";
///     ...
/// }
/// ```
///
/// # Trait Bounds
/// - `Serialize` / `DeserializeOwned`: envelope の payload との相互変換のため
/// - `Send + Sync + 'static`: Arc に格納して複数タスクから使うため
#[async_trait]
pub trait Operator: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// task_type の定義（`{namespace}.{action}.v{major}`）
    const TYPE: &'static str;

    const TEMPLATE_FIELDS: &'static [&'static str];

    const UI_COLOR: &'static str;

    /// `TEMPLATE_FIELDS` に挙げたフィールドをその場でレンダリングする
    fn render_template_fields(
        &mut self,
        renderer: &dyn TemplateRenderer,
        ctx: &TaskContext,
    ) -> Result<(), BeaconError>;

    async fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<(), BeaconError>;
}
