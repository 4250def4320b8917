//! Errors - エラー型と分類
//!
//! タスク自身はエラーを握りつぶさず、そのままホスト（Runtime）へ返します。
//! `ErrorKind` は運用上の分類で、リトライ判断などはホスト側の責務です。

use thiserror::Error;

use super::connection::ConnectionId;
use super::task::TaskType;

/// ErrorKind は実行エラーの分類
///
/// - Configuration: 設定の誤り（未知の connection、write_key 欠落、テンプレートなど）
/// - Transport: ネットワーク / サーバー側のエラー
/// - Authentication: 認証エラー（write_key が拒否された）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Authentication,
}

/// BeaconError はドメインエラー
#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("connection not found: conn_id={0}")]
    ConnectionNotFound(ConnectionId),

    #[error("invalid connection {conn_id}: {reason}")]
    InvalidConnection { conn_id: ConnectionId, reason: String },

    #[error("segment request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("segment rejected the write key (status={status})")]
    Authentication { status: u16 },

    #[error("segment rejected the request (status={status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("cannot render template field `{field}`: {message}")]
    Template { field: String, message: String },

    #[error("json decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("handler not found for task_type={0}")]
    HandlerNotFound(TaskType),

    #[error("config: {0}")]
    Config(#[from] config::ConfigError),
}

impl BeaconError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BeaconError::Transport(_) | BeaconError::Rejected { .. } => ErrorKind::Transport,
            BeaconError::Authentication { .. } => ErrorKind::Authentication,
            BeaconError::ConnectionNotFound(_)
            | BeaconError::InvalidConnection { .. }
            | BeaconError::Template { .. }
            | BeaconError::Decode(_)
            | BeaconError::HandlerNotFound(_)
            | BeaconError::Config(_) => ErrorKind::Configuration,
        }
    }

    pub fn template(field: impl Into<String>, message: impl Into<String>) -> Self {
        BeaconError::Template {
            field: field.into(),
            message: message.into(),
        }
    }
}
