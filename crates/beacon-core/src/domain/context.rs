//! TaskContext - 1 回の実行（scheduled run）のメタデータ
//!
//! ホストが `execute` に渡すコンテキストです。テンプレート変数の供給元でもあります。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RunId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskContext {
    pub dag_id: String,
    pub task_id: String,
    pub run_id: RunId,
    pub logical_date: DateTime<Utc>,
    #[serde(default = "default_try_number")]
    pub try_number: u32,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

fn default_try_number() -> u32 {
    1
}

impl TaskContext {
    pub fn new(
        dag_id: impl Into<String>,
        task_id: impl Into<String>,
        run_id: RunId,
        logical_date: DateTime<Utc>,
    ) -> Self {
        Self {
            dag_id: dag_id.into(),
            task_id: task_id.into(),
            run_id,
            logical_date,
            try_number: default_try_number(),
            params: serde_json::Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Template variables visible to `{{ name }}` placeholders.
    ///
    /// Only scalar params are exposed (`params.<key>`); objects and arrays are skipped.
    pub fn template_vars(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("ds".to_string(), self.logical_date.format("%Y-%m-%d").to_string());
        vars.insert("ds_nodash".to_string(), self.logical_date.format("%Y%m%d").to_string());
        vars.insert("ts".to_string(), self.logical_date.to_rfc3339());
        vars.insert("dag_id".to_string(), self.dag_id.clone());
        vars.insert("task_id".to_string(), self.task_id.clone());
        vars.insert("run_id".to_string(), self.run_id.to_string());
        vars.insert("try_number".to_string(), self.try_number.to_string());

        for (key, value) in &self.params {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            vars.insert(format!("params.{key}"), rendered);
        }
        vars
    }
}
