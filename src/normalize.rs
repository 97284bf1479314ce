use chrono::{DateTime, Utc};

use crate::api::FrameAnalysis;
use crate::models::EmotionSample;

/// Dominant-label value the analysis service returns when no face was
/// found in the frame. Not an error; the sample is simply skipped.
pub const NO_DETECTION_SENTINEL: &str = "Nenhum rosto detectado";

/// Converts a raw analysis result into a canonical [`EmotionSample`].
///
/// Returns `None` only for the no-detection sentinel; every other input
/// produces a best-effort sample. Score values above 1 are assumed to be
/// percentages and divided by 100 (some classifier versions return 0-100,
/// others 0-1; a value > 1 that is not a percentage would be silently
/// misread, a known ambiguity of the rule). The sample timestamp is the
/// capture time, not the server receipt time.
pub fn normalize_frame(
    analysis: &FrameAnalysis,
    captured_at: DateTime<Utc>,
) -> Option<EmotionSample> {
    let dominant_raw = analysis.dominant.as_deref().unwrap_or("neutral");
    if is_no_detection(dominant_raw) {
        return None;
    }

    let scores: std::collections::BTreeMap<String, f64> = analysis
        .scores
        .as_ref()
        .map(|raw| {
            raw.iter()
                .map(|(label, value)| (label.clone(), normalize_score(*value)))
                .collect()
        })
        .unwrap_or_default();

    // Intensity is the normalized score of the dominant label, matched
    // case-insensitively; a label with no score entry gets 0.
    let intensity = scores
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(dominant_raw))
        .map(|(_, value)| *value)
        .unwrap_or(0.0);

    Some(EmotionSample {
        timestamp: captured_at,
        dominant: capitalize_label(dominant_raw),
        intensity,
        scores,
    })
}

/// Mixed-scale rule: values above 1 are treated as percentages.
pub fn normalize_score(value: f64) -> f64 {
    if value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

/// Display casing: first character uppercased, the rest lowercased,
/// so "HAPPY", "happy" and "Happy" all render the same.
pub fn capitalize_label(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_no_detection(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case(NO_DETECTION_SENTINEL)
}
