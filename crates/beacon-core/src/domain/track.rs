//! Track event model and the Segment wire body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::MessageId;

/// Event properties. Any JSON object is accepted; values are not validated
/// locally.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// One track call as seen by an `AnalyticsClient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub user_id: String,
    pub event: String,
    pub properties: Properties,
}

impl TrackEvent {
    pub fn new(user_id: impl Into<String>, event: impl Into<String>, properties: Properties) -> Self {
        Self {
            user_id: user_id.into(),
            event: event.into(),
            properties,
        }
    }
}

/// Library identification sent in `context.library`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
}

impl Default for LibraryInfo {
    fn default() -> Self {
        Self {
            name: "beacon".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackContext {
    pub library: LibraryInfo,
}

/// Body of `POST /v1/track`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: String,
    pub event: String,
    pub properties: Properties,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
    pub context: TrackContext,
}

impl TrackRequest {
    pub fn new(event: &TrackEvent, message_id: MessageId, now: DateTime<Utc>) -> Self {
        Self {
            kind: "track".to_string(),
            user_id: event.user_id.clone(),
            event: event.event.clone(),
            properties: event.properties.clone(),
            message_id: message_id.to_string(),
            timestamp: now,
            sent_at: now,
            context: TrackContext {
                library: LibraryInfo::default(),
            },
        }
    }
}
