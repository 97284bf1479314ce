use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::{AnalysisBackend, FrameRequest};
use crate::history::EmotionHistory;
use crate::normalize::normalize_frame;

use super::controller::SessionHandle;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const FRAME_TIMEOUT_SECS: u64 = 10;

/// One frame produced by the capture collaborator.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub captured_at: DateTime<Utc>,
    /// Data-URL base64 payload, e.g. `data:image/jpeg;base64,...`.
    pub frame_base64: String,
}

/// Boundary to the capture collaborator (webcam, file replay, ...).
#[async_trait]
pub trait FrameSource: Send + Sync + 'static {
    /// Next frame, or `None` when nothing is available this tick.
    async fn next_frame(&self) -> Result<Option<CapturedFrame>>;
}

/// Periodic capture-and-submit loop. Ticks at the configured interval,
/// pulls one frame, and submits it tagged with the active session id.
/// While no session is active every tick is skipped, so frames are never
/// sent before consent opened a session or after an open failure.
pub(super) async fn capture_loop(
    backend: Arc<dyn AnalysisBackend>,
    source: Arc<dyn FrameSource>,
    history: EmotionHistory,
    session: SessionHandle,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(session_id) = session.current() else {
                    // NoSession: drop the frame silently.
                    continue;
                };

                let frame = match tokio::time::timeout(
                    Duration::from_secs(FRAME_TIMEOUT_SECS),
                    source.next_frame(),
                )
                .await
                {
                    Ok(Ok(Some(frame))) => frame,
                    Ok(Ok(None)) => continue,
                    Ok(Err(err)) => {
                        log_error!("frame capture failed: {err:?}");
                        continue;
                    }
                    Err(_) => {
                        log_warn!("frame capture timeout (> {FRAME_TIMEOUT_SECS}s)");
                        continue;
                    }
                };

                // Submit without blocking the ticker. Requests may overlap
                // when the round trip exceeds the interval; the window then
                // reflects completion order, not capture order.
                let backend = Arc::clone(&backend);
                let history = history.clone();
                let session = session.clone();
                tokio::spawn(async move {
                    submit_frame(backend, history, session, session_id, frame).await;
                });
            }
            _ = cancel_token.cancelled() => {
                log_info!("capture loop shutting down");
                break;
            }
        }
    }
}

async fn submit_frame(
    backend: Arc<dyn AnalysisBackend>,
    history: EmotionHistory,
    session: SessionHandle,
    session_id: String,
    frame: CapturedFrame,
) {
    let request = FrameRequest {
        session_uuid: session_id.clone(),
        timestamp: frame.captured_at.timestamp_millis(),
        frame_base64: frame.frame_base64,
    };

    let analysis = match backend.analyze_frame(&request).await {
        Ok(analysis) => analysis,
        Err(err) => {
            // One dropped frame; later frames are unaffected.
            log_warn!("frame analysis failed: {err:#}");
            return;
        }
    };

    // A response that outlived its session must not reach the window.
    if session.current().as_deref() != Some(session_id.as_str()) {
        log_info!("discarding analysis response for stale session {session_id}");
        return;
    }

    match normalize_frame(&analysis, frame.captured_at) {
        Some(sample) => history.append(sample).await,
        None => log_info!("no face detected, skipping sample"),
    }
}
