//! DynOperator - Operator の型消去
//!
//! `TypedOperator<O>` を `DynOperator` に変換することで、
//! HashMap<String, Arc<dyn DynOperator>> に格納可能にします。

use std::marker::PhantomData;

use async_trait::async_trait;

use super::context::ExecutionContext;
use super::operator::Operator;
use crate::domain::BeaconError;

/// DynOperator は object-safe な Operator の抽象化
///
/// payload(JSON) → decode → render → execute をまとめて行う。
#[async_trait]
pub trait DynOperator: Send + Sync {
    async fn run(&self, payload: serde_json::Value, ctx: &ExecutionContext<'_>) -> Result<(), BeaconError>;

    fn task_type(&self) -> &'static str;

    fn template_fields(&self) -> &'static [&'static str];

    fn ui_color(&self) -> &'static str;
}

pub struct TypedOperator<O: Operator> {
    _marker: PhantomData<fn() -> O>,
}

impl<O: Operator> TypedOperator<O> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<O: Operator> Default for TypedOperator<O> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<O: Operator> DynOperator for TypedOperator<O> {
    async fn run(&self, payload: serde_json::Value, ctx: &ExecutionContext<'_>) -> Result<(), BeaconError> {
        let mut operator: O = serde_json::from_value(payload)?;
        operator.render_template_fields(ctx.services.renderer.as_ref(), ctx.task)?;
        operator.execute(ctx).await
    }

    fn task_type(&self) -> &'static str {
        O::TYPE
    }

    fn template_fields(&self) -> &'static [&'static str] {
        O::TEMPLATE_FIELDS
    }

    fn ui_color(&self) -> &'static str {
        O::UI_COLOR
    }
}
