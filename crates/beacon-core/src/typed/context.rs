//! ExecutionContext - operator の execute に渡す依存のまとまり

use std::sync::Arc;

use crate::domain::TaskContext;
use crate::observability::TaskLogger;
use crate::ports::{AnalyticsClientFactory, CredentialResolver, TemplateRenderer};

/// ホストが用意する外部依存
#[derive(Clone)]
pub struct Services {
    pub credentials: Arc<dyn CredentialResolver>,
    pub clients: Arc<dyn AnalyticsClientFactory>,
    pub renderer: Arc<dyn TemplateRenderer>,
}

impl Services {
    pub fn new(
        credentials: Arc<dyn CredentialResolver>,
        clients: Arc<dyn AnalyticsClientFactory>,
        renderer: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            credentials,
            clients,
            renderer,
        }
    }
}

/// 1 回の実行で operator が触れるもの全部
pub struct ExecutionContext<'a> {
    pub task: &'a TaskContext,
    pub log: &'a TaskLogger,
    pub services: &'a Services,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(task: &'a TaskContext, log: &'a TaskLogger, services: &'a Services) -> Self {
        Self { task, log, services }
    }
}
