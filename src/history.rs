use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::models::EmotionSample;

/// Default window size; matches the 30-point timeline on the dashboard.
pub const DEFAULT_WINDOW: usize = 30;

/// Bounded, time-ordered window of recent samples. Append-only with FIFO
/// eviction: once `limit` is reached the oldest sample is dropped first,
/// so the window always holds the most recent N samples in arrival order.
/// Arrival order is completion order of the analyze requests; the store
/// never re-sorts by timestamp.
pub struct EmotionHistory {
    inner: Arc<Mutex<HistoryState>>,
}

struct HistoryState {
    samples: Vec<EmotionSample>,
    limit: usize,
    last_update: Option<DateTime<Utc>>,
}

impl EmotionHistory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_WINDOW)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HistoryState {
                samples: Vec::with_capacity(limit),
                limit: limit.max(1),
                last_update: None,
            })),
        }
    }

    pub async fn append(&self, sample: EmotionSample) {
        let mut state = self.inner.lock().await;
        if state.samples.len() >= state.limit {
            state.samples.remove(0);
        }
        state.samples.push(sample);
        state.last_update = Some(Utc::now());
    }

    /// Most recently appended sample, if any.
    pub async fn latest(&self) -> Option<EmotionSample> {
        self.inner.lock().await.samples.last().cloned()
    }

    /// Snapshot of the full window, oldest first.
    pub async fn all(&self) -> Vec<EmotionSample> {
        self.inner.lock().await.samples.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.samples.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.samples.is_empty()
    }

    /// Wall-clock time of the last append; the dashboard header shows it.
    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().await.last_update
    }
}

impl Default for EmotionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EmotionHistory {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
