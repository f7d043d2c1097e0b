use crate::models::{DetectedLabel, ObjectMetadata};

/// Custom metadata field carrying user-supplied, comma separated labels.
pub const CUSTOM_LABELS_FIELD: &str = "customlabels";

pub fn parse_custom_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .collect()
}

pub fn custom_labels(metadata: &ObjectMetadata) -> Vec<String> {
    metadata
        .custom
        .get(CUSTOM_LABELS_FIELD)
        .map(|raw| parse_custom_labels(raw))
        .unwrap_or_default()
}

/// Detected labels first, custom labels appended. Duplicates are kept.
pub fn merge_labels(detected: &[DetectedLabel], custom: Vec<String>) -> Vec<String> {
    let mut labels: Vec<String> = detected
        .iter()
        .map(|label| label.name.to_lowercase())
        .collect();
    labels.extend(custom);
    labels
}
