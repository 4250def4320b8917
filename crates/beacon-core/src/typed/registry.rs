//! OperatorRegistry - Operator の登録と管理
//!
//! - `register::<O: Operator>()` で登録
//! - 内部的に TypedOperator でラップして DynOperator に変換
//! - HashMap<String, Arc<dyn DynOperator>> で管理

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{DynOperator, TypedOperator};
use super::operator::Operator;

/// OperatorRegistry は task_type → operator の対応表
///
/// # 使用例
/// ```ignore
/// let mut registry = OperatorRegistry::new();
/// registry.register::<SegmentTrackEventOperator>()?;
///
/// let op = registry.get("segment.track_event.v1");
/// ```
#[derive(Default)]
pub struct OperatorRegistry {
    operators: HashMap<String, Arc<dyn DynOperator>>,
}

/// RegistryError は OperatorRegistry の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Operator for task type '{0}' is already registered")]
    AlreadyRegistered(String),
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self {
            operators: HashMap::new(),
        }
    }

    pub fn register<O: Operator>(&mut self) -> Result<(), RegistryError> {
        let task_type = O::TYPE.to_string();
        if self.operators.contains_key(&task_type) {
            return Err(RegistryError::AlreadyRegistered(task_type));
        }
        self.operators
            .insert(task_type, Arc::new(TypedOperator::<O>::new()));
        Ok(())
    }

    pub fn get(&self, task_type: &str) -> Option<Arc<dyn DynOperator>> {
        self.operators.get(task_type).cloned()
    }

    pub fn registered_types(&self) -> Vec<String> {
        self.operators.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentTrackEventOperator;

    #[test]
    fn test_register_and_get() {
        let mut registry = OperatorRegistry::new();
        registry.register::<SegmentTrackEventOperator>().unwrap();

        let op = registry.get(SegmentTrackEventOperator::TYPE).unwrap();
        assert_eq!(op.task_type(), "segment.track_event.v1");
        assert_eq!(op.template_fields(), &["user_id", "event", "properties"]);
        assert_eq!(op.ui_color(), "#ffd700");
    }

    #[test]
    fn test_double_registration() {
        let mut registry = OperatorRegistry::new();
        registry.register::<SegmentTrackEventOperator>().unwrap();
        let result = registry.register::<SegmentTrackEventOperator>();
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registered_types() {
        let mut registry = OperatorRegistry::new();
        assert!(registry.is_empty());
        registry.register::<SegmentTrackEventOperator>().unwrap();
        assert_eq!(registry.registered_types(), vec![SegmentTrackEventOperator::TYPE.to_string()]);
    }

    #[test]
    fn test_unknown_type_is_none() {
        let registry = OperatorRegistry::new();
        assert!(registry.get("segment.identify.v1").is_none());
    }
}
