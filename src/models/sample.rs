use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical score keys as emitted by the remote classifier (lowercase).
pub const CLASSIFIER_LABELS: [&str; 7] = [
    "angry", "disgust", "fear", "happy", "sad", "surprise", "neutral",
];

/// Portuguese display label for a classifier key. The dashboard shows the
/// Portuguese names; the wire always carries the English classifier keys.
/// Returns `None` for keys outside the classifier set.
pub fn display_label_pt(label: &str) -> Option<&'static str> {
    let mapped = match label.to_ascii_lowercase().as_str() {
        "angry" => "Raiva",
        "disgust" => "Nojo",
        "fear" => "Medo",
        "happy" => "Alegria",
        "sad" => "Tristeza",
        "surprise" => "Surpresa",
        "neutral" => "Neutro",
        _ => return None,
    };
    Some(mapped)
}

/// One canonical, timestamped emotion-analysis result. Immutable once
/// created; samples only ever leave the window by FIFO eviction.
///
/// `intensity` is the normalized score of `dominant`, and every value in
/// `scores` is in [0, 1] after normalization. The scores are independent
/// confidences and are not required to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSample {
    pub timestamp: DateTime<Utc>,
    /// Display-cased dominant emotion label, e.g. "Happy".
    pub dominant: String,
    pub intensity: f64,
    /// Per-category confidences keyed by the classifier's own label set.
    pub scores: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_labels_cover_the_classifier_set() {
        for label in CLASSIFIER_LABELS {
            assert!(
                display_label_pt(label).is_some(),
                "missing display label for {label}"
            );
        }
    }

    #[test]
    fn display_label_lookup_is_case_insensitive() {
        assert_eq!(display_label_pt("HAPPY"), Some("Alegria"));
        assert_eq!(display_label_pt("Neutral"), Some("Neutro"));
    }

    #[test]
    fn unknown_labels_have_no_display_name() {
        assert_eq!(display_label_pt("boredom"), None);
    }
}
