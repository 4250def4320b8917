//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）

use std::sync::Arc;

use super::runtime::Runtime;
use crate::typed::{Operator, OperatorRegistry, RegistryError, Services};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(services)
///     .register::<SegmentTrackEventOperator>()?
///     .expect_tasks(&["segment.track_event.v1"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_tasks() で期待される task_type を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
pub struct AppBuilder {
    registry: OperatorRegistry,
    services: Services,
    expected_tasks: Option<Vec<String>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing task types: {0:?}. These tasks were expected but not registered.")]
    MissingTaskTypes(Vec<String>),
}

impl AppBuilder {
    pub fn new(services: Services) -> Self {
        Self {
            registry: OperatorRegistry::new(),
            services,
            expected_tasks: None,
        }
    }

    pub fn register<O: Operator>(mut self) -> Result<Self, RegistryError> {
        self.registry.register::<O>()?;
        Ok(self)
    }

    pub fn expect_tasks(mut self, task_types: &[&str]) -> Self {
        self.expected_tasks = Some(task_types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        if let Some(expected_tasks) = &self.expected_tasks {
            let registered_types = self.registry.registered_types();
            let missing_tasks: Vec<String> = expected_tasks
                .iter()
                .filter(|x| !registered_types.contains(x))
                .cloned()
                .collect();
            if !missing_tasks.is_empty() {
                return Err(BuildError::MissingTaskTypes(missing_tasks));
            }
        }
        Ok(App {
            runtime: Runtime::new(Arc::new(self.registry), self.services),
        })
    }
}

/// App は構築済みのランタイムを保持する
pub struct App {
    pub runtime: Runtime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{ContextTemplateRenderer, RecordingClientFactory, StaticCredentialResolver};
    use crate::segment::SegmentTrackEventOperator;

    fn services() -> Services {
        Services::new(
            Arc::new(StaticCredentialResolver::new()),
            Arc::new(RecordingClientFactory::new()),
            Arc::new(ContextTemplateRenderer::new()),
        )
    }

    #[test]
    fn test_build_success() {
        let app = AppBuilder::new(services())
            .register::<SegmentTrackEventOperator>()
            .unwrap()
            .expect_tasks(&[SegmentTrackEventOperator::TYPE])
            .build();
        assert!(app.is_ok());
    }

    #[test]
    fn test_build_missing_task_types() {
        let app = AppBuilder::new(services())
            .register::<SegmentTrackEventOperator>()
            .unwrap()
            .expect_tasks(&[SegmentTrackEventOperator::TYPE, "segment.identify.v1"])
            .build();
        assert!(matches!(
            app,
            Err(BuildError::MissingTaskTypes(missing)) if missing == vec!["segment.identify.v1".to_string()]
        ));
    }

    #[test]
    fn test_build_no_expect_tasks() {
        let app = AppBuilder::new(services()).build().unwrap();
        assert!(app.runtime.registry().is_empty());
    }
}
