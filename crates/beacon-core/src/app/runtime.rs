//! Runtime - envelope を operator に渡して 1 回だけ実行する

use std::sync::Arc;

use tracing::{Instrument, error, info};

use crate::domain::{BeaconError, TaskContext, TaskEnvelope};
use crate::observability::TaskLogger;
use crate::typed::{ExecutionContext, OperatorRegistry, Services};

/// Runtime executes a `TaskEnvelope` by dispatching to a registered operator.
pub struct Runtime {
    registry: Arc<OperatorRegistry>,
    services: Services,
}

impl Runtime {
    pub fn new(registry: Arc<OperatorRegistry>, services: Services) -> Self {
        Self { registry, services }
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// Execute one envelope.
    ///
    /// 失敗はそのまま返す（リトライはしない）。ログは成功・失敗どちらも 1 行ずつ。
    pub async fn execute(&self, envelope: &TaskEnvelope, context: &TaskContext) -> Result<(), BeaconError> {
        let task_type = envelope.task_type();
        let operator = self
            .registry
            .get(task_type.as_str())
            .ok_or_else(|| BeaconError::HandlerNotFound(task_type.clone()))?;

        let log = TaskLogger::for_run(context, task_type.as_str());
        let ctx = ExecutionContext::new(context, &log, &self.services);

        let result = operator
            .run(envelope.payload().clone(), &ctx)
            .instrument(log.span().clone())
            .await;

        match &result {
            Ok(()) => info!(parent: log.span(), "task succeeded"),
            Err(e) => error!(parent: log.span(), kind = ?e.kind(), error = %e, "task failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Connection, ConnectionId, RunId, TaskType, TrackEvent};
    use crate::impls::{ContextTemplateRenderer, RecordingClientFactory, StaticCredentialResolver};
    use crate::segment::SegmentTrackEventOperator;
    use crate::typed::Operator;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use ulid::Ulid;

    fn runtime(factory: &RecordingClientFactory) -> Runtime {
        let mut registry = OperatorRegistry::new();
        registry.register::<SegmentTrackEventOperator>().unwrap();

        let resolver = StaticCredentialResolver::new().with_connection(
            ConnectionId::default(),
            Connection::new(ConnectionId::default()).with_extra("write_key", json!("wk")),
        );
        let services = Services::new(
            Arc::new(resolver),
            Arc::new(factory.clone()),
            Arc::new(ContextTemplateRenderer::new()),
        );
        Runtime::new(Arc::new(registry), services)
    }

    fn context() -> TaskContext {
        TaskContext::new(
            "growth",
            "track_signup",
            RunId::from_ulid(Ulid::nil()),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn runtime_renders_and_executes_registered_operator() {
        let factory = RecordingClientFactory::new();
        let env = TaskEnvelope::new(
            TaskType::new(SegmentTrackEventOperator::TYPE),
            json!({ "user_id": "u1", "event": "signup_{{ ds_nodash }}" }),
        );

        runtime(&factory).execute(&env, &context()).await.unwrap();

        assert_eq!(
            factory.calls(),
            vec![TrackEvent::new("u1", "signup_20240305", serde_json::Map::new())]
        );
    }

    #[tokio::test]
    async fn runtime_errors_when_operator_missing() {
        let factory = RecordingClientFactory::new();
        let env = TaskEnvelope::new(TaskType::new("missing"), json!({}));

        let err = runtime(&factory).execute(&env, &context()).await.unwrap_err();

        assert!(matches!(err, BeaconError::HandlerNotFound(_)));
        assert!(err.to_string().contains("handler"));
    }

    #[tokio::test]
    async fn runtime_reports_decode_errors() {
        let factory = RecordingClientFactory::new();
        let env = TaskEnvelope::new(
            TaskType::new(SegmentTrackEventOperator::TYPE),
            json!({ "event": "signup" }),
        );

        let err = runtime(&factory).execute(&env, &context()).await.unwrap_err();

        assert!(matches!(err, BeaconError::Decode(_)));
        assert!(factory.calls().is_empty());
    }
}
