//! RecordingAnalyticsClient - 送信せずに track 呼び出しを記録する
//!
//! `--dry-run` とテストで使います。`fail_with` で失敗を仕込めます。

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::info;

use crate::domain::{BeaconError, Properties, SegmentCredentials, TrackEvent};
use crate::ports::{AnalyticsClient, AnalyticsClientFactory};

type FailureFn = dyn Fn() -> BeaconError + Send + Sync;

#[derive(Default)]
struct Recorded {
    calls: Vec<TrackEvent>,
    built: Vec<(SegmentCredentials, bool)>,
}

/// factory と client で記録を共有する
#[derive(Clone, Default)]
pub struct RecordingClientFactory {
    recorded: Arc<Mutex<Recorded>>,
    failure: Option<Arc<FailureFn>>,
}

impl RecordingClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の track を毎回このエラーで失敗させる（呼び出し自体は記録される）
    pub fn fail_with(mut self, failure: impl Fn() -> BeaconError + Send + Sync + 'static) -> Self {
        self.failure = Some(Arc::new(failure));
        self
    }

    pub fn calls(&self) -> Vec<TrackEvent> {
        lock(&self.recorded).calls.clone()
    }

    /// build() に渡された credentials と debug フラグ
    pub fn builds(&self) -> Vec<(SegmentCredentials, bool)> {
        lock(&self.recorded).built.clone()
    }
}

// poison されても記録は読めるようにする
fn lock(recorded: &Mutex<Recorded>) -> MutexGuard<'_, Recorded> {
    recorded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AnalyticsClientFactory for RecordingClientFactory {
    fn build(
        &self,
        credentials: SegmentCredentials,
        debug: bool,
    ) -> Result<Arc<dyn AnalyticsClient>, BeaconError> {
        lock(&self.recorded).built.push((credentials, debug));
        Ok(Arc::new(RecordingAnalyticsClient {
            recorded: Arc::clone(&self.recorded),
            failure: self.failure.clone(),
        }))
    }
}

pub struct RecordingAnalyticsClient {
    recorded: Arc<Mutex<Recorded>>,
    failure: Option<Arc<FailureFn>>,
}

#[async_trait]
impl AnalyticsClient for RecordingAnalyticsClient {
    async fn track(
        &self,
        user_id: &str,
        event: &str,
        properties: &Properties,
    ) -> Result<(), BeaconError> {
        lock(&self.recorded)
            .calls
            .push(TrackEvent::new(user_id, event, properties.clone()));
        info!(user_id, event, "recorded track call (not sent)");

        match &self.failure {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> SegmentCredentials {
        SegmentCredentials {
            write_key: "wk".to_string(),
            endpoint: None,
        }
    }

    #[tokio::test]
    async fn records_calls_and_builds() {
        let factory = RecordingClientFactory::new();
        let client = factory.build(creds(), true).unwrap();

        client.track("u1", "signup", &Properties::new()).await.unwrap();

        assert_eq!(factory.calls(), vec![TrackEvent::new("u1", "signup", Properties::new())]);
        assert_eq!(factory.builds(), vec![(creds(), true)]);
    }

    #[tokio::test]
    async fn primed_failure_is_returned_after_recording() {
        let factory =
            RecordingClientFactory::new().fail_with(|| BeaconError::Authentication { status: 401 });
        let client = factory.build(creds(), false).unwrap();

        let err = client.track("u1", "signup", &Properties::new()).await.unwrap_err();

        assert!(matches!(err, BeaconError::Authentication { status: 401 }));
        assert_eq!(factory.calls().len(), 1);
    }
}
