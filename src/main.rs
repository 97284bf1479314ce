use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use chrono::Utc;
use log::{info, warn};

use emotion_sense::{
    aggregate, AgentConfig, ApiClient, CaptureController, CapturedFrame, ConsentPreferences,
    ConsentStore, EmotionHistory, FrameSource,
};

/// Development frame source: cycles through the image files of a
/// directory, encoding each as a data-URL. Stands in for the webcam
/// collaborator when running the agent against a local API.
struct StillFrameSource {
    frames: Vec<PathBuf>,
    cursor: AtomicUsize,
}

impl StillFrameSource {
    fn from_dir(dir: &Path) -> Result<Self> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read frames dir {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| mime_for(path).is_some())
            .collect();
        frames.sort();

        if frames.is_empty() {
            warn!("no image files found in {}", dir.display());
        }
        Ok(Self {
            frames,
            cursor: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl FrameSource for StillFrameSource {
    async fn next_frame(&self) -> Result<Option<CapturedFrame>> {
        if self.frames.is_empty() {
            return Ok(None);
        }

        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        let path = &self.frames[index];
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read frame {}", path.display()))?;

        let mime = mime_for(path).unwrap_or("image/jpeg");
        Ok(Some(CapturedFrame {
            captured_at: Utc::now(),
            frame_base64: format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes)),
        }))
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("emotion-sense agent starting up...");

    let config = AgentConfig::from_env();
    std::fs::create_dir_all(&config.data_dir)?;

    let consent_store = ConsentStore::new(config.consent_path());
    let consent = match consent_store.current() {
        Some(consent) => consent,
        None if std::env::var("EMOTION_ACCEPT_ALL").as_deref() == Ok("1") => {
            // Dev shortcut mirroring the dashboard's "accept all" button.
            let consent = ConsentPreferences::accept_all();
            consent_store.grant(consent)?;
            consent
        }
        None => {
            anyhow::bail!(
                "no consent recorded at {}; complete the dashboard consent flow \
                 or set EMOTION_ACCEPT_ALL=1 for development",
                config.consent_path().display()
            );
        }
    };

    let frames_dir = std::env::var("EMOTION_FRAMES_DIR").unwrap_or_else(|_| "frames".to_string());
    let source = Arc::new(StillFrameSource::from_dir(Path::new(&frames_dir))?);

    let client = Arc::new(ApiClient::new(&config)?);
    info!("analysis API at {}", client.base_url());

    let history = EmotionHistory::with_limit(config.history_limit);
    let mut controller = CaptureController::new(client, history.clone(), &config);
    controller.start(&consent, source).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutting down");
    controller.stop().await?;

    let window = history.all().await;
    if let Some(state) = aggregate::current(&window) {
        info!(
            "final state: {} at {:.2} across {} samples",
            state.dominant,
            state.intensity,
            window.len()
        );
        for (label, mean) in aggregate::mean_scores(&window) {
            let display = emotion_sense::models::display_label_pt(&label)
                .unwrap_or(label.as_str());
            info!("  {display}: {mean:.2}");
        }
    } else {
        info!("no samples collected");
    }

    Ok(())
}
