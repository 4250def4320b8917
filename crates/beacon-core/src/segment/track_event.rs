//! SegmentTrackEventOperator - Segment に track event を 1 件送る
//!
//! 実行の流れ: connection 解決 → client 構築 → ログ → track → 終了。
//! エラーはそのまま返す（catch / retry / 変換なし）。

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use super::hook::SegmentHook;
use crate::domain::{BeaconError, ConnectionId, Properties, TaskContext};
use crate::ports::TemplateRenderer;
use crate::typed::{ExecutionContext, Operator};

/// Send a track event to Segment for a specified `user_id` and `event`.
///
/// - `user_id`: the ID for this user in your database (templated)
/// - `event`: the name of the event you're tracking (templated)
/// - `properties`: properties for the event (templated); `None`/`null` becomes `{}`
/// - `segment_conn_id`: connection to use, `segment_default` unless set
/// - `segment_debug_mode`: run the client in debug mode, `false` unless set
///
/// Unknown payload keys (host kwargs such as `owner` or `retries`) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTrackEventOperator {
    user_id: String,
    event: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    properties: Properties,
    #[serde(default, alias = "connection_id")]
    segment_conn_id: ConnectionId,
    #[serde(default, alias = "debug_mode")]
    segment_debug_mode: bool,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Properties>::deserialize(deserializer)?.unwrap_or_default())
}

impl SegmentTrackEventOperator {
    pub fn new(user_id: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            event: event.into(),
            properties: Properties::new(),
            segment_conn_id: ConnectionId::default(),
            segment_debug_mode: false,
        }
    }

    pub fn with_properties(mut self, properties: Option<Properties>) -> Self {
        self.properties = properties.unwrap_or_default();
        self
    }

    pub fn with_conn_id(mut self, conn_id: ConnectionId) -> Self {
        self.segment_conn_id = conn_id;
        self
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.segment_debug_mode = debug_mode;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn conn_id(&self) -> &ConnectionId {
        &self.segment_conn_id
    }

    pub fn debug_mode(&self) -> bool {
        self.segment_debug_mode
    }
}

/// properties 内の文字列を再帰的にレンダリングする（キーと非文字列値はそのまま）
fn render_value(
    renderer: &dyn TemplateRenderer,
    ctx: &TaskContext,
    value: &mut serde_json::Value,
) -> Result<(), BeaconError> {
    match value {
        serde_json::Value::String(s) => {
            *s = renderer.render("properties", s, ctx)?;
        }
        serde_json::Value::Array(items) => {
            for item in items {
                render_value(renderer, ctx, item)?;
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values_mut() {
                render_value(renderer, ctx, item)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[async_trait]
impl Operator for SegmentTrackEventOperator {
    const TYPE: &'static str = "segment.track_event.v1";
    const TEMPLATE_FIELDS: &'static [&'static str] = &["user_id", "event", "properties"];
    const UI_COLOR: &'static str = "#ffd700";

    fn render_template_fields(
        &mut self,
        renderer: &dyn TemplateRenderer,
        ctx: &TaskContext,
    ) -> Result<(), BeaconError> {
        self.user_id = renderer.render("user_id", &self.user_id, ctx)?;
        self.event = renderer.render("event", &self.event, ctx)?;
        for value in self.properties.values_mut() {
            render_value(renderer, ctx, value)?;
        }
        Ok(())
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<(), BeaconError> {
        let hook = SegmentHook::new(self.segment_conn_id.clone(), self.segment_debug_mode);
        let client = hook
            .get_conn(ctx.services.credentials.as_ref(), ctx.services.clients.as_ref())
            .await?;

        info!(
            parent: ctx.log.span(),
            event = %self.event,
            user_id = %self.user_id,
            properties = %serde_json::Value::Object(self.properties.clone()),
            "Sending track event ({}) for user id: {}",
            self.event,
            self.user_id,
        );

        client
            .track(&self.user_id, &self.event, &self.properties)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Connection, RunId, TrackEvent};
    use crate::impls::{ContextTemplateRenderer, RecordingClientFactory, StaticCredentialResolver};
    use crate::observability::TaskLogger;
    use crate::typed::Services;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;
    use ulid::Ulid;

    fn props(value: serde_json::Value) -> Properties {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Properties::new(),
        }
    }

    fn ctx() -> TaskContext {
        TaskContext::new(
            "growth",
            "track_signup",
            RunId::from_ulid(Ulid::nil()),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
        )
        .with_param("user", json!("u42"))
    }

    fn services(factory: &RecordingClientFactory) -> Services {
        let resolver = StaticCredentialResolver::new().with_connection(
            ConnectionId::default(),
            Connection::new(ConnectionId::default()).with_extra("write_key", json!("wk")),
        );
        Services::new(
            Arc::new(resolver),
            Arc::new(factory.clone()),
            Arc::new(ContextTemplateRenderer::new()),
        )
    }

    async fn execute(op: &SegmentTrackEventOperator, factory: &RecordingClientFactory) -> Result<(), BeaconError> {
        let services = services(factory);
        let task = ctx();
        let log = TaskLogger::disabled();
        op.execute(&ExecutionContext::new(&task, &log, &services)).await
    }

    #[test]
    fn defaults_match_constructor() {
        let op = SegmentTrackEventOperator::new("u1", "signup");
        assert_eq!(op.conn_id().as_str(), "segment_default");
        assert!(!op.debug_mode());
        assert!(op.properties().is_empty());
    }

    #[rstest]
    #[case::omitted(json!({ "user_id": "u2", "event": "login" }))]
    #[case::null(json!({ "user_id": "u2", "event": "login", "properties": null }))]
    #[case::host_kwargs(json!({ "user_id": "u2", "event": "login", "owner": "growth", "retries": 3 }))]
    fn missing_properties_decode_as_empty(#[case] payload: serde_json::Value) {
        let op: SegmentTrackEventOperator = serde_json::from_value(payload).unwrap();
        assert_eq!(op, SegmentTrackEventOperator::new("u2", "login"));
    }

    #[test]
    fn non_object_properties_are_rejected() {
        let result = serde_json::from_value::<SegmentTrackEventOperator>(json!({
            "user_id": "u1", "event": "x", "properties": [1, 2]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn connection_aliases_are_accepted() {
        let op: SegmentTrackEventOperator = serde_json::from_value(json!({
            "user_id": "u1", "event": "x", "connection_id": "other", "debug_mode": true
        }))
        .unwrap();
        assert_eq!(op.conn_id().as_str(), "other");
        assert!(op.debug_mode());
    }

    #[tokio::test]
    async fn execute_tracks_exact_values() {
        let factory = RecordingClientFactory::new();
        let op = SegmentTrackEventOperator::new("u1", "signup")
            .with_properties(Some(props(json!({ "plan": "pro" }))));

        execute(&op, &factory).await.unwrap();

        assert_eq!(
            factory.calls(),
            vec![TrackEvent::new("u1", "signup", props(json!({ "plan": "pro" })))]
        );
    }

    #[tokio::test]
    async fn execute_with_omitted_properties_sends_empty_mapping() {
        let factory = RecordingClientFactory::new();
        let op = SegmentTrackEventOperator::new("u2", "login").with_properties(None);

        execute(&op, &factory).await.unwrap();

        assert_eq!(factory.calls(), vec![TrackEvent::new("u2", "login", Properties::new())]);
    }

    #[tokio::test]
    async fn unknown_connection_fails_without_tracking() {
        let factory = RecordingClientFactory::new();
        let op = SegmentTrackEventOperator::new("u3", "x").with_conn_id(ConnectionId::new("missing"));

        let err = execute(&op, &factory).await.unwrap_err();

        assert!(matches!(err, BeaconError::ConnectionNotFound(ref id) if id.as_str() == "missing"));
        assert!(factory.calls().is_empty());
        assert!(factory.builds().is_empty());
    }

    #[tokio::test]
    async fn track_failure_propagates_without_retry() {
        let factory = RecordingClientFactory::new().fail_with(|| BeaconError::Rejected {
            status: 503,
            body: "unavailable".to_string(),
        });
        let op = SegmentTrackEventOperator::new("u1", "signup");

        let err = execute(&op, &factory).await.unwrap_err();

        assert!(matches!(err, BeaconError::Rejected { status: 503, .. }));
        assert_eq!(factory.calls().len(), 1);
    }

    #[test]
    fn template_fields_are_rendered_in_place() {
        let mut op = SegmentTrackEventOperator::new("{{ params.user }}", "report_{{ ds }}")
            .with_properties(Some(props(json!({
                "day": "{{ ds }}",
                "tags": ["{{ dag_id }}", 7],
                "nested": { "task": "{{ task_id }}" },
                "{{ ds }}": true
            }))));

        op.render_template_fields(&ContextTemplateRenderer::new(), &ctx()).unwrap();

        assert_eq!(op.user_id(), "u42");
        assert_eq!(op.event(), "report_2024-03-05");
        assert_eq!(
            serde_json::Value::Object(op.properties().clone()),
            json!({
                "day": "2024-03-05",
                "tags": ["growth", 7],
                "nested": { "task": "track_signup" },
                "{{ ds }}": true
            })
        );
    }

    #[test]
    fn template_error_names_the_field() {
        let mut op = SegmentTrackEventOperator::new("u1", "{{ nope }}");
        let err = op
            .render_template_fields(&ContextTemplateRenderer::new(), &ctx())
            .unwrap_err();
        assert!(matches!(err, BeaconError::Template { ref field, .. } if field == "event"));
    }
}
