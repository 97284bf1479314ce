use std::{fs, path::PathBuf, sync::RwLock};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// File name of the persisted consent record inside the data directory.
/// Mirrors the `emotion_consent` key the dashboard uses in local storage.
pub const CONSENT_FILE: &str = "emotion_consent.json";

/// Consent flags collected once by the consent gate. Immutable for the
/// lifetime of a session; `camera` gates capture, the record as a whole
/// gates whether a remote session is opened at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentPreferences {
    pub camera: bool,
    pub mic: bool,
    pub bio: bool,
    pub storage: bool,
}

impl Default for ConsentPreferences {
    fn default() -> Self {
        Self {
            camera: true,
            mic: true,
            bio: false,
            storage: false,
        }
    }
}

impl ConsentPreferences {
    pub fn accept_all() -> Self {
        Self {
            camera: true,
            mic: true,
            bio: true,
            storage: true,
        }
    }
}

/// Persisted consent record. A missing or malformed file is treated as
/// "no consent yet", never as an error.
pub struct ConsentStore {
    path: PathBuf,
    data: RwLock<Option<ConsentPreferences>>,
}

impl ConsentStore {
    pub fn new(path: PathBuf) -> Self {
        let data = match fs::read_to_string(&path) {
            Ok(contents) => {
                let parsed = serde_json::from_str(&contents).ok();
                if parsed.is_none() {
                    warn!(
                        "stored consent at {} is malformed, treating as no consent",
                        path.display()
                    );
                }
                parsed
            }
            Err(_) => None,
        };

        Self {
            path,
            data: RwLock::new(data),
        }
    }

    pub fn current(&self) -> Option<ConsentPreferences> {
        *self.data.read().unwrap()
    }

    /// Records a consent grant and persists it for the next visit.
    pub fn grant(&self, prefs: ConsentPreferences) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&prefs)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write consent to {}", self.path.display()))?;
        *self.data.write().unwrap() = Some(prefs);
        Ok(())
    }

    /// Removes the persisted record, forcing the consent prompt next time.
    pub fn revoke(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove consent at {}", self.path.display()))?;
        }
        *self.data.write().unwrap() = None;
        Ok(())
    }
}
