use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::consent::ConsentPreferences;
use crate::device::DeviceInfo;

/// Body of `POST {base}/session/start`.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest<'a> {
    pub device_info: &'a DeviceInfo,
    pub consent: &'a ConsentPreferences,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionResponse {
    pub session_uuid: String,
}

/// Body of `POST {base}/analyze/frame`. `frame_base64` is a data-URL
/// (`data:image/jpeg;base64,...`); the server strips the prefix itself.
#[derive(Debug, Clone, Serialize)]
pub struct FrameRequest {
    pub session_uuid: String,
    /// Capture time in epoch milliseconds.
    pub timestamp: i64,
    pub frame_base64: String,
}

/// Canonical analyze-frame response. This is the only shape the normalizer
/// ever sees; the older wire variant goes through [`LegacyAnalysis`] first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub status: String,
    /// Server receipt time in epoch milliseconds.
    pub received_at: i64,
    #[serde(default)]
    pub dominant: Option<String>,
    #[serde(default)]
    pub intensity: Option<f64>,
    #[serde(default)]
    pub scores: Option<BTreeMap<String, f64>>,
}

/// Older wire shape returned by the `/analyze-emotion` endpoint variant.
/// Kept only as an adapter at the boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyAnalysis {
    pub dominant_emotion: String,
    pub emotions: BTreeMap<String, f64>,
}

impl From<LegacyAnalysis> for FrameAnalysis {
    fn from(legacy: LegacyAnalysis) -> Self {
        FrameAnalysis {
            status: "ok".to_string(),
            received_at: Utc::now().timestamp_millis(),
            dominant: Some(legacy.dominant_emotion),
            // The legacy shape has no separate intensity field; the
            // normalizer recovers it from the score of the dominant label.
            intensity: None,
            scores: Some(legacy.emotions),
        }
    }
}
