use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// TaskType + Payload の“運搬用”データ。
///
/// payload は operator の設定レコード（JSON）。テンプレートは未レンダリングのまま。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    task_type: TaskType,
    #[serde(default)]
    payload: serde_json::Value,
}

impl TaskEnvelope {
    pub fn new(task_type: TaskType, payload: serde_json::Value) -> Self {
        Self { task_type, payload }
    }

    pub fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_decodes_from_flat_json() {
        let env: TaskEnvelope = serde_json::from_value(json!({
            "task_type": "segment.track_event.v1",
            "payload": { "user_id": "u1", "event": "signup" }
        }))
        .unwrap();

        assert_eq!(env.task_type().as_str(), "segment.track_event.v1");
        assert_eq!(env.payload()["user_id"], "u1");
    }
}
