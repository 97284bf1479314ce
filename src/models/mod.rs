pub mod sample;

pub use sample::{display_label_pt, EmotionSample, CLASSIFIER_LABELS};
