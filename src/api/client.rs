use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::config::AgentConfig;
use crate::consent::ConsentPreferences;
use crate::device::DeviceInfo;

use super::types::{FrameAnalysis, FrameRequest, StartSessionRequest, StartSessionResponse};

/// Boundary to the remote analysis collaborator. The capture loop talks to
/// this trait so the session machine can be exercised without a server.
#[async_trait]
pub trait AnalysisBackend: Send + Sync + 'static {
    /// Opens an analysis session and returns the server-issued opaque id.
    async fn start_session(
        &self,
        device_info: &DeviceInfo,
        consent: &ConsentPreferences,
    ) -> Result<String>;

    /// Submits one captured frame for emotion analysis.
    async fn analyze_frame(&self, request: &FrameRequest) -> Result<FrameAnalysis>;
}

/// HTTP client for the emotion analysis API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AnalysisBackend for ApiClient {
    async fn start_session(
        &self,
        device_info: &DeviceInfo,
        consent: &ConsentPreferences,
    ) -> Result<String> {
        let url = format!("{}/session/start", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&StartSessionRequest {
                device_info,
                consent,
            })
            .send()
            .await
            .context("session start request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("session start failed: {status}");
        }

        let body: StartSessionResponse = response
            .json()
            .await
            .context("session start response was not valid JSON")?;
        Ok(body.session_uuid)
    }

    async fn analyze_frame(&self, request: &FrameRequest) -> Result<FrameAnalysis> {
        let url = format!("{}/analyze/frame", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .context("analyze frame request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("analyze frame failed: {status}: {body}");
        }

        response
            .json()
            .await
            .context("analyze frame response was not valid JSON")
    }
}
