use std::{path::PathBuf, time::Duration};

use crate::consent::CONSENT_FILE;

const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_CAPTURE_INTERVAL_MS: u64 = 2000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for the capture agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the analysis API, without a trailing slash.
    pub api_url: String,
    pub capture_interval: Duration,
    /// Applies to both the session-open and analyze-frame requests;
    /// a timeout counts as a failed request.
    pub request_timeout: Duration,
    pub history_limit: usize,
    /// Directory holding the persisted consent record.
    pub data_dir: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            capture_interval: Duration::from_millis(DEFAULT_CAPTURE_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            history_limit: crate::history::DEFAULT_WINDOW,
            data_dir: PathBuf::from("."),
        }
    }
}

impl AgentConfig {
    /// Reads overrides from the environment, falling back to defaults for
    /// anything missing or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("EMOTION_API_URL") {
            if !url.is_empty() {
                config.api_url = url;
            }
        }
        if let Some(interval_ms) = read_env_u64("EMOTION_CAPTURE_INTERVAL_MS") {
            if interval_ms > 0 {
                config.capture_interval = Duration::from_millis(interval_ms);
            }
        }
        if let Some(timeout_secs) = read_env_u64("EMOTION_REQUEST_TIMEOUT_SECS") {
            if timeout_secs > 0 {
                config.request_timeout = Duration::from_secs(timeout_secs);
            }
        }
        if let Some(limit) = read_env_u64("EMOTION_HISTORY_LIMIT") {
            if limit > 0 {
                config.history_limit = limit as usize;
            }
        }
        if let Ok(dir) = std::env::var("EMOTION_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        config
    }

    pub fn consent_path(&self) -> PathBuf {
        self.data_dir.join(CONSENT_FILE)
    }
}

fn read_env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}
