//! Capture-side agent and aggregation core for an emotion analysis
//! dashboard: a consent-gated session lifecycle, a thin client for the
//! remote analysis API, and the rolling sample window every visualization
//! reads from. Frame capture and chart rendering stay behind the
//! [`FrameSource`] and aggregation seams.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod consent;
pub mod device;
pub mod history;
pub mod models;
pub mod normalize;
pub mod session;
mod utils;

pub use api::{AnalysisBackend, ApiClient};
pub use config::AgentConfig;
pub use consent::{ConsentPreferences, ConsentStore};
pub use device::DeviceInfo;
pub use history::EmotionHistory;
pub use models::EmotionSample;
pub use session::{CaptureController, CapturedFrame, FrameSource};
