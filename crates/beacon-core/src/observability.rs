//! TaskLogger - 実行ごとのロガー
//!
//! グローバルな logger を直接使わず、実行単位の span を operator に明示的に渡します。

use tracing::Span;

use crate::domain::TaskContext;

#[derive(Debug, Clone)]
pub struct TaskLogger {
    span: Span,
}

impl TaskLogger {
    pub fn for_run(ctx: &TaskContext, task_type: &str) -> Self {
        let span = tracing::info_span!(
            "task",
            dag_id = %ctx.dag_id,
            task_id = %ctx.task_id,
            run_id = %ctx.run_id,
            try_number = ctx.try_number,
            task_type,
        );
        Self { span }
    }

    /// 何も出力しない logger（テストや単体実行用）
    pub fn disabled() -> Self {
        Self { span: Span::none() }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}
