//! Backend readiness polling.
//!
//! The poller issues `GET` requests against the backend's base URL until one
//! returns 200 or the attempt budget runs out. Any 200 counts as healthy;
//! the body is not inspected.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::LaunchError;

/// Retry budget for the health poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    /// Maximum number of probes (N).
    pub max_attempts: u32,
    /// Delay between probes (D).
    pub interval: Duration,
    /// Per-probe timeout (T).
    pub request_timeout: Duration,
}

impl HealthPolicy {
    /// `N × D`, reported when the budget is exhausted.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_millis(500),
            request_timeout: Duration::from_secs(2),
        }
    }
}

/// Readiness of the backend as seen by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Pending,
    Healthy,
    Failed,
}

impl HealthState {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Counts probe outcomes and moves `Pending` to a terminal state.
///
/// Once `Healthy` or `Failed`, further outcomes are ignored.
#[derive(Debug, Clone)]
pub struct HealthTracker {
    state: HealthState,
    attempts: u32,
    max_attempts: u32,
}

impl HealthTracker {
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            state: HealthState::Pending,
            attempts: 0,
            max_attempts,
        }
    }

    pub const fn state(&self) -> HealthState {
        self.state
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record one probe outcome and return the resulting state.
    pub fn record(&mut self, healthy: bool) -> HealthState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.attempts += 1;
        if healthy {
            self.state = HealthState::Healthy;
        } else if self.attempts >= self.max_attempts {
            self.state = HealthState::Failed;
        }
        self.state
    }
}

/// A single HTTP GET against a URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// Return the response status code, or a transport error message.
    async fn probe(&self, url: &str) -> Result<u16, String>;
}

/// [`HttpProbe`] backed by a `reqwest` client.
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    pub fn new(request_timeout: Duration) -> Result<Self, LaunchError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .no_proxy()
            .build()
            .map_err(|e| LaunchError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn probe(&self, url: &str) -> Result<u16, String> {
        self.client
            .get(url)
            .send()
            .await
            .map(|response| response.status().as_u16())
            .map_err(|e| e.to_string())
    }
}

/// Polls a URL until it answers 200 or the policy's attempts run out.
pub struct HealthPoller {
    policy: HealthPolicy,
    probe: Arc<dyn HttpProbe>,
}

impl HealthPoller {
    pub fn new(policy: HealthPolicy, probe: Arc<dyn HttpProbe>) -> Self {
        Self { policy, probe }
    }

    /// Poller using a real HTTP client with the policy's per-request timeout.
    pub fn http(policy: HealthPolicy) -> Result<Self, LaunchError> {
        let probe = ReqwestProbe::new(policy.request_timeout)?;
        Ok(Self::new(policy, Arc::new(probe)))
    }

    pub const fn policy(&self) -> &HealthPolicy {
        &self.policy
    }

    /// Probe `url` until healthy. Returns the number of attempts used.
    ///
    /// The first probe goes out immediately; later ones follow a fixed delay.
    pub async fn wait_until_healthy(&self, url: &str) -> Result<u32, LaunchError> {
        info!(%url, max_attempts = self.policy.max_attempts, "Waiting for backend to become healthy");
        let mut tracker = HealthTracker::new(self.policy.max_attempts);

        loop {
            let healthy = self.probe_once(url, tracker.attempts() + 1).await;
            match tracker.record(healthy) {
                HealthState::Healthy => {
                    info!(%url, attempts = tracker.attempts(), "Backend is healthy");
                    return Ok(tracker.attempts());
                }
                HealthState::Failed => {
                    warn!(%url, attempts = tracker.attempts(), "Backend health budget exhausted");
                    return Err(LaunchError::HealthTimeout {
                        url: url.to_string(),
                        attempts: tracker.attempts(),
                        budget: self.policy.budget(),
                    });
                }
                HealthState::Pending => sleep(self.policy.interval).await,
            }
        }
    }

    async fn probe_once(&self, url: &str, attempt: u32) -> bool {
        match timeout(self.policy.request_timeout, self.probe.probe(url)).await {
            Ok(Ok(200)) => true,
            Ok(Ok(status)) => {
                debug!(attempt, status, "Health probe returned non-200");
                false
            }
            Ok(Err(e)) => {
                debug!(attempt, error = %e, "Health probe failed");
                false
            }
            Err(_) => {
                debug!(attempt, "Health probe timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    const URL: &str = "http://127.0.0.1:31340/";

    /// Replays canned outcomes, then refuses connections.
    struct ScriptedProbe {
        script: Mutex<VecDeque<Result<u16, String>>>,
        calls: AtomicU32,
    }

    impl ScriptedProbe {
        fn new(script: impl IntoIterator<Item = Result<u16, String>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().collect()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpProbe for ScriptedProbe {
        async fn probe(&self, _url: &str) -> Result<u16, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("connection refused".to_string()))
        }
    }

    /// Never answers.
    struct HangingProbe(AtomicU32);

    #[async_trait]
    impl HttpProbe for HangingProbe {
        async fn probe(&self, _url: &str) -> Result<u16, String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[test]
    fn tracker_states_are_terminal() {
        let mut tracker = HealthTracker::new(2);
        assert_eq!(tracker.record(false), HealthState::Pending);
        assert_eq!(tracker.record(true), HealthState::Healthy);
        assert_eq!(tracker.record(false), HealthState::Healthy);
        assert_eq!(tracker.attempts(), 2);

        let mut tracker = HealthTracker::new(1);
        assert_eq!(tracker.record(false), HealthState::Failed);
        assert_eq!(tracker.record(true), HealthState::Failed);
        assert_eq!(tracker.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_on_first_attempt_makes_one_call() {
        let probe = ScriptedProbe::new([Ok(200)]);
        let poller = HealthPoller::new(HealthPolicy::default(), probe.clone());

        let start = Instant::now();
        let attempts = poller.wait_until_healthy(URL).await.unwrap();

        assert_eq!(attempts, 1);
        assert_eq!(probe.calls(), 1);
        assert!(start.elapsed() <= HealthPolicy::default().interval);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_right_after_first_success() {
        let probe = ScriptedProbe::new([
            Ok(503),
            Err("connection refused".into()),
            Ok(404),
            Ok(200),
            Ok(200),
        ]);
        let poller = HealthPoller::new(HealthPolicy::default(), probe.clone());

        let attempts = poller.wait_until_healthy(URL).await.unwrap();

        assert_eq!(attempts, 4);
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn fails_after_exactly_n_attempts() {
        let policy = HealthPolicy::default();
        let probe = ScriptedProbe::new([]);
        let poller = HealthPoller::new(policy, probe.clone());

        let start = Instant::now();
        let err = poller.wait_until_healthy(URL).await.unwrap_err();

        assert_eq!(probe.calls(), 30);
        assert_eq!(start.elapsed(), policy.interval * 29);
        match err {
            LaunchError::HealthTimeout {
                attempts, budget, ..
            } => {
                assert_eq!(attempts, 30);
                assert_eq!(budget, Duration::from_secs(15));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_probe_consumes_attempt_after_timeout() {
        let policy = HealthPolicy {
            max_attempts: 3,
            interval: Duration::from_millis(500),
            request_timeout: Duration::from_secs(2),
        };
        let probe = Arc::new(HangingProbe(AtomicU32::new(0)));
        let poller = HealthPoller::new(policy, probe.clone());

        let start = Instant::now();
        let result = poller.wait_until_healthy(URL).await;

        assert!(matches!(
            result,
            Err(LaunchError::HealthTimeout { attempts: 3, .. })
        ));
        assert_eq!(probe.0.load(Ordering::SeqCst), 3);
        assert_eq!(
            start.elapsed(),
            policy.request_timeout * 3 + policy.interval * 2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn mocked_probe_receives_the_base_url() {
        let mut probe = MockHttpProbe::new();
        probe
            .expect_probe()
            .withf(|url| url == URL)
            .times(1)
            .returning(|_| Ok(200));
        let poller = HealthPoller::new(HealthPolicy::default(), Arc::new(probe));

        tokio_test::assert_ok!(poller.wait_until_healthy(URL).await);
    }
}
