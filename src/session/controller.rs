use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{error, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::AnalysisBackend;
use crate::config::AgentConfig;
use crate::consent::ConsentPreferences;
use crate::device::DeviceInfo;
use crate::history::EmotionHistory;

use super::loop_worker::{capture_loop, FrameSource};

/// Shared view of the active session id. In-flight submissions read it to
/// reject stale responses; only the controller writes it.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<String>>>,
}

impl SessionHandle {
    pub fn current(&self) -> Option<String> {
        self.inner.read().unwrap().clone()
    }

    fn set(&self, id: Option<String>) {
        *self.inner.write().unwrap() = id;
    }
}

/// Two-state session machine: `NoSession` until a consent grant opens a
/// remote session, `SessionActive` once the server issued an id. The open
/// request fires exactly once per [`CaptureController::start`]; a failed
/// open stays in `NoSession` (the loop still runs and drops every frame)
/// until an external retry stops and restarts the controller.
pub struct CaptureController {
    backend: Arc<dyn AnalysisBackend>,
    history: EmotionHistory,
    session: SessionHandle,
    capture_interval: Duration,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl CaptureController {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        history: EmotionHistory,
        config: &AgentConfig,
    ) -> Self {
        Self {
            backend,
            history,
            session: SessionHandle::default(),
            capture_interval: config.capture_interval,
            handle: None,
            cancel_token: None,
        }
    }

    /// Opens a remote session for this consent grant and starts the
    /// capture loop as a scoped task owned by the controller.
    pub async fn start(
        &mut self,
        consent: &ConsentPreferences,
        source: Arc<dyn FrameSource>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("capture already active");
        }
        if !consent.camera {
            bail!("camera consent not granted");
        }

        let device_info = DeviceInfo::collect();
        match self.backend.start_session(&device_info, consent).await {
            Ok(session_uuid) => {
                info!("analysis session {session_uuid} opened");
                self.session.set(Some(session_uuid));
            }
            Err(err) => {
                // NoSession: frames are dropped until a restart retries.
                error!("failed to open analysis session: {err:#}");
            }
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(capture_loop(
            Arc::clone(&self.backend),
            source,
            self.history.clone(),
            self.session.clone(),
            self.capture_interval,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub fn session_id(&self) -> Option<String> {
        self.session.current()
    }

    pub fn is_active(&self) -> bool {
        self.session.current().is_some()
    }

    /// Stops the loop and discards the session id. No close call is sent
    /// to the server; responses still in flight are rejected by the
    /// stale-session guard.
    pub async fn stop(&mut self) -> Result<()> {
        self.session.set(None);

        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("capture loop task failed to join")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::api::{FrameAnalysis, FrameRequest};
    use crate::session::CapturedFrame;

    struct MockBackend {
        fail_session_open: bool,
        dominant: Option<String>,
        scores: BTreeMap<String, f64>,
        analyze_delay: Duration,
        analyze_calls: AtomicUsize,
    }

    impl MockBackend {
        fn new(dominant: &str, scores: &[(&str, f64)]) -> Self {
            Self {
                fail_session_open: false,
                dominant: Some(dominant.to_string()),
                scores: scores
                    .iter()
                    .map(|(label, value)| (label.to_string(), *value))
                    .collect(),
                analyze_delay: Duration::ZERO,
                analyze_calls: AtomicUsize::new(0),
            }
        }

        fn failing_open() -> Self {
            Self {
                fail_session_open: true,
                dominant: None,
                scores: BTreeMap::new(),
                analyze_delay: Duration::ZERO,
                analyze_calls: AtomicUsize::new(0),
            }
        }

        fn with_analyze_delay(mut self, delay: Duration) -> Self {
            self.analyze_delay = delay;
            self
        }
    }

    #[async_trait]
    impl AnalysisBackend for MockBackend {
        async fn start_session(
            &self,
            _device_info: &DeviceInfo,
            _consent: &ConsentPreferences,
        ) -> Result<String> {
            if self.fail_session_open {
                Err(anyhow!("session start failed: 503 Service Unavailable"))
            } else {
                Ok(Uuid::new_v4().to_string())
            }
        }

        async fn analyze_frame(&self, request: &FrameRequest) -> Result<FrameAnalysis> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            if self.analyze_delay > Duration::ZERO {
                tokio::time::sleep(self.analyze_delay).await;
            }
            Ok(FrameAnalysis {
                status: "ok".to_string(),
                received_at: request.timestamp,
                dominant: self.dominant.clone(),
                intensity: None,
                scores: Some(self.scores.clone()),
            })
        }
    }

    struct TickSource;

    #[async_trait]
    impl FrameSource for TickSource {
        async fn next_frame(&self) -> Result<Option<CapturedFrame>> {
            Ok(Some(CapturedFrame {
                captured_at: Utc::now(),
                frame_base64: "data:image/jpeg;base64,ZnJhbWU=".to_string(),
            }))
        }
    }

    fn fast_config() -> AgentConfig {
        AgentConfig {
            capture_interval: Duration::from_millis(10),
            ..AgentConfig::default()
        }
    }

    #[tokio::test]
    async fn frames_flow_into_history_while_active() {
        let backend = Arc::new(MockBackend::new("happy", &[("happy", 90.0), ("sad", 10.0)]));
        let history = EmotionHistory::new();
        let mut controller =
            CaptureController::new(backend.clone(), history.clone(), &fast_config());

        controller
            .start(&ConsentPreferences::default(), Arc::new(TickSource))
            .await
            .unwrap();
        assert!(controller.is_active());

        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.stop().await.unwrap();

        assert!(backend.analyze_calls.load(Ordering::SeqCst) > 0);
        let latest = history.latest().await.unwrap();
        assert_eq!(latest.dominant, "Happy");
        assert_eq!(latest.intensity, 0.9);
    }

    #[tokio::test]
    async fn failed_session_open_blocks_all_submissions() {
        let backend = Arc::new(MockBackend::failing_open());
        let history = EmotionHistory::new();
        let mut controller =
            CaptureController::new(backend.clone(), history.clone(), &fast_config());

        controller
            .start(&ConsentPreferences::default(), Arc::new(TickSource))
            .await
            .unwrap();
        assert!(!controller.is_active());

        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.stop().await.unwrap();

        assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 0);
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn no_detection_responses_never_reach_history() {
        let backend = Arc::new(MockBackend::new(
            "Nenhum rosto detectado",
            &[("neutral", 0.5)],
        ));
        let history = EmotionHistory::new();
        let mut controller =
            CaptureController::new(backend.clone(), history.clone(), &fast_config());

        controller
            .start(&ConsentPreferences::default(), Arc::new(TickSource))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.stop().await.unwrap();

        assert!(backend.analyze_calls.load(Ordering::SeqCst) > 0);
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn refusing_camera_consent_never_starts() {
        let backend = Arc::new(MockBackend::new("happy", &[("happy", 0.9)]));
        let mut controller =
            CaptureController::new(backend.clone(), EmotionHistory::new(), &fast_config());

        let consent = ConsentPreferences {
            camera: false,
            ..ConsentPreferences::default()
        };
        assert!(controller
            .start(&consent, Arc::new(TickSource))
            .await
            .is_err());
        assert!(!controller.is_active());
    }

    #[tokio::test]
    async fn starting_twice_is_rejected() {
        let backend = Arc::new(MockBackend::new("happy", &[("happy", 0.9)]));
        let mut controller =
            CaptureController::new(backend, EmotionHistory::new(), &fast_config());

        controller
            .start(&ConsentPreferences::default(), Arc::new(TickSource))
            .await
            .unwrap();
        assert!(controller
            .start(&ConsentPreferences::default(), Arc::new(TickSource))
            .await
            .is_err());
        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn responses_landing_after_stop_are_discarded() {
        // Responses take longer than the window between start and stop, so
        // every analysis completes against an already-discarded session id.
        let backend = Arc::new(
            MockBackend::new("happy", &[("happy", 0.9)])
                .with_analyze_delay(Duration::from_millis(200)),
        );
        let history = EmotionHistory::new();
        let mut controller =
            CaptureController::new(backend.clone(), history.clone(), &fast_config());

        controller
            .start(&ConsentPreferences::default(), Arc::new(TickSource))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.stop().await.unwrap();

        // Let the in-flight submissions finish before asserting.
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(backend.analyze_calls.load(Ordering::SeqCst) > 0);
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn stop_discards_the_session_id() {
        let backend = Arc::new(MockBackend::new("happy", &[("happy", 0.9)]));
        let mut controller =
            CaptureController::new(backend, EmotionHistory::new(), &fast_config());

        controller
            .start(&ConsentPreferences::default(), Arc::new(TickSource))
            .await
            .unwrap();
        assert!(controller.session_id().is_some());

        controller.stop().await.unwrap();
        assert_eq!(controller.session_id(), None);
    }
}
