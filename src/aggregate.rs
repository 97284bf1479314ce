//! Read-only views over a history window. Every function here is a pure
//! function of the slice it is given; nothing mutates the window.

use std::collections::BTreeMap;

use crate::models::EmotionSample;

/// The latest sample's dominant emotion and intensity, for the
/// "current state" card.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentEmotion {
    pub dominant: String,
    pub intensity: f64,
}

/// Arithmetic mean of each category's score across the window, for the
/// distribution chart. A category absent from a sample contributes 0 for
/// that sample. An empty window yields an empty map; there is never a
/// division by zero.
pub fn mean_scores(window: &[EmotionSample]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    if window.is_empty() {
        return sums;
    }

    for sample in window {
        for (label, value) in &sample.scores {
            *sums.entry(label.clone()).or_insert(0.0) += value;
        }
    }

    let count = window.len() as f64;
    for value in sums.values_mut() {
        *value /= count;
    }
    sums
}

/// "No data" is represented as `None` on an empty window.
pub fn current(window: &[EmotionSample]) -> Option<CurrentEmotion> {
    window.last().map(|sample| CurrentEmotion {
        dominant: sample.dominant.clone(),
        intensity: sample.intensity,
    })
}

/// Last `n` samples, oldest first, for reduced-range charts. The whole
/// window is returned when `n` exceeds its length.
pub fn time_slice(window: &[EmotionSample], n: usize) -> &[EmotionSample] {
    let start = window.len().saturating_sub(n);
    &window[start..]
}
