//! Readiness polling for asynchronously processed uploads.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::{FileState, MediaIngestion, RemoteFile, RemoteHandle};

/// Bounds for the readiness poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between consecutive status checks.
    pub interval: Duration,
    /// Give up once this much time has passed since polling started.
    pub timeout: Option<Duration>,
    /// Give up after this many status checks.
    pub max_polls: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            timeout: Some(Self::DEFAULT_TIMEOUT),
            max_polls: None,
        }
    }
}

impl PollPolicy {
    /// Default sleep between status checks.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
    /// Default overall wait limit.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    /// Poll every `interval` with the default timeout.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Poll every `interval` with no time or count limit. Only cancellation stops it.
    #[must_use]
    pub const fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
            max_polls: None,
        }
    }

    /// Set the overall wait limit.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of status checks.
    #[must_use]
    pub const fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Whether another status check is allowed after `polls` checks and `elapsed` time.
    #[must_use]
    pub fn allows_another(&self, polls: u32, elapsed: Duration) -> bool {
        let under_count = self.max_polls.is_none_or(|max| polls < max);
        let under_time = self.timeout.is_none_or(|limit| elapsed < limit);
        under_count && under_time
    }
}

/// Poll `handle` until the service no longer reports it as processing.
///
/// Sleeps `policy.interval` before every status check, so a file that is
/// reported as processing `N` times and then active costs exactly `N + 1`
/// status calls. With a timeout, neither a sleep nor a status call runs past
/// the deadline.
///
/// # Errors
///
/// - [`Error::MediaProcessing`] if the service reports a failure
/// - [`Error::MediaProcessingTimeout`] if the policy bounds are exhausted
/// - [`Error::Cancelled`] if `cancel` fires while waiting
/// - any error returned by the status lookup
pub async fn wait_until_ready(
    service: &dyn MediaIngestion,
    handle: &RemoteHandle,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<RemoteFile> {
    let started = Instant::now();
    let deadline = policy.timeout.map(|limit| started + limit);
    let mut polls: u32 = 0;

    let timed_out = |polls: u32| Error::MediaProcessingTimeout {
        handle: handle.clone(),
        waited: started.elapsed(),
        polls,
    };

    loop {
        if !policy.allows_another(polls, started.elapsed()) {
            return Err(timed_out(polls));
        }

        let pause = deadline.map_or(policy.interval, |deadline| {
            policy
                .interval
                .min(deadline.saturating_duration_since(Instant::now()))
        });

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            () = tokio::time::sleep(pause) => {}
        }

        let lookup = async {
            match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, service.status(handle))
                    .await
                    .ok(),
                None => Some(service.status(handle).await),
            }
        };

        let current = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            status = lookup => match status {
                Some(status) => status?,
                None => return Err(timed_out(polls)),
            },
        };
        polls += 1;

        if current.state.is_processing() {
            debug!(%handle, polls, "media still processing");
            continue;
        }

        if current.state == FileState::Failed {
            let reason = current
                .error
                .unwrap_or_else(|| "remote processing failed".to_owned());
            return Err(Error::MediaProcessing {
                handle: handle.clone(),
                reason,
            });
        }

        info!(%handle, polls, waited = ?started.elapsed(), "media ready");
        return Ok(current);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// Answers status checks from a script, repeating the last entry.
    struct ScriptedService {
        script: Mutex<Vec<FileState>>,
        status_calls: AtomicU32,
    }

    impl ScriptedService {
        fn new(script: Vec<FileState>) -> Self {
            Self {
                script: Mutex::new(script),
                status_calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.status_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MediaIngestion for ScriptedService {
        async fn upload(&self, _path: &Path, _mime_type: &str) -> Result<RemoteFile> {
            panic!("upload is not used by the poller");
        }

        async fn status(&self, handle: &RemoteHandle) -> Result<RemoteFile> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            let state = if script.len() > 1 {
                script.remove(0)
            } else {
                script[0]
            };
            let file = RemoteFile::new(handle.as_str(), "uri", "video/mp4", state);
            Ok(if state == FileState::Failed {
                file.with_error("unsupported codec")
            } else {
                file
            })
        }
    }

    /// Accepts status checks but never answers them.
    struct SilentService {
        status_calls: AtomicU32,
    }

    #[async_trait]
    impl MediaIngestion for SilentService {
        async fn upload(&self, _path: &Path, _mime_type: &str) -> Result<RemoteFile> {
            panic!("upload is not used by the poller");
        }

        async fn status(&self, _handle: &RemoteHandle) -> Result<RemoteFile> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    fn handle() -> RemoteHandle {
        RemoteHandle::new("files/video1")
    }

    mod policy {
        use super::*;

        #[test]
        fn default_is_one_second_and_bounded() {
            let policy = PollPolicy::default();
            assert_eq!(policy.interval, Duration::from_secs(1));
            assert!(policy.timeout.is_some());
        }

        #[test]
        fn unbounded_always_allows() {
            let policy = PollPolicy::unbounded(Duration::from_millis(10));
            assert!(policy.allows_another(u32::MAX - 1, Duration::from_secs(86_400)));
        }

        #[test]
        fn bounds_are_respected() {
            let policy = PollPolicy::unbounded(Duration::from_secs(1))
                .with_max_polls(2)
                .with_timeout(Duration::from_secs(10));
            assert!(policy.allows_another(1, Duration::from_secs(1)));
            assert!(!policy.allows_another(2, Duration::from_secs(1)));
            assert!(!policy.allows_another(0, Duration::from_secs(10)));
        }
    }

    mod wait {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn n_processing_then_active_costs_n_plus_one_checks() {
            for n in [0_u32, 1, 4] {
                let mut script = vec![FileState::Processing; n as usize];
                script.push(FileState::Active);
                let service = ScriptedService::new(script);
                let started = Instant::now();

                let file = wait_until_ready(
                    &service,
                    &handle(),
                    &PollPolicy::default(),
                    &CancellationToken::new(),
                )
                .await
                .unwrap();

                assert_eq!(file.state, FileState::Active);
                assert_eq!(service.calls(), n + 1);
                assert_eq!(started.elapsed(), Duration::from_secs(u64::from(n + 1)));
            }
        }

        #[tokio::test(start_paused = true)]
        async fn failed_state_surfaces_reason() {
            let service = ScriptedService::new(vec![FileState::Processing, FileState::Failed]);

            let err = wait_until_ready(
                &service,
                &handle(),
                &PollPolicy::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

            match err {
                Error::MediaProcessing { handle, reason } => {
                    assert_eq!(handle.as_str(), "files/video1");
                    assert_eq!(reason, "unsupported codec");
                }
                other => panic!("expected MediaProcessing, got {other:?}"),
            }
            assert_eq!(service.calls(), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn stalled_asset_times_out() {
            let service = ScriptedService::new(vec![FileState::Processing]);
            let policy = PollPolicy::new(Duration::from_secs(1)).with_timeout(Duration::from_secs(5));

            let err = wait_until_ready(&service, &handle(), &policy, &CancellationToken::new())
                .await
                .unwrap_err();

            assert!(matches!(err, Error::MediaProcessingTimeout { polls: 5, .. }));
            assert_eq!(service.calls(), 5);
        }

        #[tokio::test(start_paused = true)]
        async fn interval_longer_than_timeout_stops_at_the_deadline() {
            let service = ScriptedService::new(vec![FileState::Processing]);
            let policy = PollPolicy::new(Duration::from_secs(30)).with_timeout(Duration::from_secs(5));
            let started = Instant::now();

            let err = wait_until_ready(&service, &handle(), &policy, &CancellationToken::new())
                .await
                .unwrap_err();

            match err {
                Error::MediaProcessingTimeout { waited, polls, .. } => {
                    assert_eq!(waited, Duration::from_secs(5));
                    assert_eq!(polls, 1);
                }
                other => panic!("expected MediaProcessingTimeout, got {other:?}"),
            }
            assert_eq!(started.elapsed(), Duration::from_secs(5));
            assert_eq!(service.calls(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn unanswered_status_check_ends_at_the_deadline() {
            let service = SilentService {
                status_calls: AtomicU32::new(0),
            };
            let policy = PollPolicy::new(Duration::from_secs(1)).with_timeout(Duration::from_secs(5));
            let started = Instant::now();

            let err = wait_until_ready(&service, &handle(), &policy, &CancellationToken::new())
                .await
                .unwrap_err();

            assert!(matches!(err, Error::MediaProcessingTimeout { polls: 0, .. }));
            assert_eq!(started.elapsed(), Duration::from_secs(5));
            assert_eq!(service.status_calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn max_polls_caps_status_checks() {
            let service = ScriptedService::new(vec![FileState::Processing]);
            let policy = PollPolicy::unbounded(Duration::from_secs(1)).with_max_polls(3);

            let err = wait_until_ready(&service, &handle(), &policy, &CancellationToken::new())
                .await
                .unwrap_err();

            assert!(matches!(err, Error::MediaProcessingTimeout { polls: 3, .. }));
            assert_eq!(service.calls(), 3);
        }

        #[tokio::test(start_paused = true)]
        async fn cancellation_stops_the_wait() {
            let service = ScriptedService::new(vec![FileState::Processing]);
            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(2500)).await;
                trigger.cancel();
            });

            let err = wait_until_ready(
                &service,
                &handle(),
                &PollPolicy::unbounded(Duration::from_secs(1)),
                &cancel,
            )
            .await
            .unwrap_err();

            assert!(matches!(err, Error::Cancelled));
            assert_eq!(service.calls(), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn unspecified_state_ends_the_wait() {
            let service = ScriptedService::new(vec![FileState::StateUnspecified]);

            let file = wait_until_ready(
                &service,
                &handle(),
                &PollPolicy::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

            assert_eq!(file.state, FileState::StateUnspecified);
            assert_eq!(service.calls(), 1);
        }
    }
}
