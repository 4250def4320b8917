//! SegmentHttpClient - Segment HTTP Tracking API の薄いラッパー
//!
//! 1 回の `track` につき `POST {endpoint}/v1/track` を 1 回だけ送ります。
//! バッチ・キューイング・リトライはしません。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error};

use crate::domain::{BeaconError, Properties, SegmentCredentials, TrackEvent, TrackRequest};
use crate::ports::{AnalyticsClient, AnalyticsClientFactory, Clock, IdGenerator};

pub const DEFAULT_ENDPOINT: &str = "https://api.segment.io";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SegmentHttpClient {
    http: Client,
    track_url: String,
    write_key: String,
    timeout: Duration,
    debug: bool,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl SegmentHttpClient {
    pub fn track_url(&self) -> &str {
        &self.track_url
    }

    /// エラーをログに出してから返す（呼び出し側で握りつぶさない）
    fn on_error(&self, err: BeaconError) -> BeaconError {
        error!(url = %self.track_url, error = %err, "encountered segment error");
        err
    }
}

#[async_trait]
impl AnalyticsClient for SegmentHttpClient {
    async fn track(
        &self,
        user_id: &str,
        event: &str,
        properties: &Properties,
    ) -> Result<(), BeaconError> {
        let event = TrackEvent::new(user_id, event, properties.clone());
        let request = TrackRequest::new(&event, self.ids.generate_message_id(), self.clock.now());
        if self.debug {
            debug!(url = %self.track_url, body = ?request, "sending segment track request");
        }

        let response = self
            .http
            .post(&self.track_url)
            .basic_auth(&self.write_key, None::<&str>)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.on_error(BeaconError::Transport(e)))?;

        let status = response.status();
        if self.debug {
            debug!(status = status.as_u16(), message_id = %request.message_id, "segment responded");
        }
        if status.is_success() {
            return Ok(());
        }

        let err = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BeaconError::Authentication {
                status: status.as_u16(),
            },
            _ => BeaconError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            },
        };
        Err(self.on_error(err))
    }
}

/// SegmentClientFactory は `reqwest::Client` を共有して client を作る
pub struct SegmentClientFactory {
    http: Client,
    endpoint: String,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl SegmentClientFactory {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            http: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            clock,
            ids,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 具体型で返す版（テストや直接利用向け）
    pub fn build_http(&self, credentials: SegmentCredentials, debug: bool) -> SegmentHttpClient {
        let endpoint = credentials.endpoint.unwrap_or_else(|| self.endpoint.clone());
        SegmentHttpClient {
            http: self.http.clone(),
            track_url: format!("{}/v1/track", endpoint.trim_end_matches('/')),
            write_key: credentials.write_key,
            timeout: self.timeout,
            debug,
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
        }
    }
}

impl AnalyticsClientFactory for SegmentClientFactory {
    fn build(
        &self,
        credentials: SegmentCredentials,
        debug: bool,
    ) -> Result<Arc<dyn AnalyticsClient>, BeaconError> {
        Ok(Arc::new(self.build_http(credentials, debug)))
    }
}
