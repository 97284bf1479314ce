pub mod client;
pub mod types;

pub use client::{AnalysisBackend, ApiClient};
pub use types::{FrameAnalysis, FrameRequest, LegacyAnalysis, StartSessionResponse};
