use crate::models::{IntentSlots, KeywordSource};

pub const STOPWORDS: [&str; 11] = [
    "show", "me", "photos", "images", "pictures", "of", "with", "find", "search", "for", "and",
];

pub const PRIMARY_SLOT: &str = "labels";
pub const SECONDARY_SLOT: &str = "labels2";

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty() && !is_stopword(token))
        .collect()
}

/// Keywords carried by the `labels` / `labels2` slots. The secondary slot is
/// only read when the primary one is filled.
pub fn keywords_from_slots(slots: &IntentSlots) -> Vec<String> {
    let Some(primary) = slots.get(PRIMARY_SLOT) else {
        return Vec::new();
    };

    let mut text = primary.to_string();
    if let Some(secondary) = slots.get(SECONDARY_SLOT) {
        text.push(' ');
        text.push_str(secondary);
    }

    tokenize(&text)
}

/// Prefer slot keywords; otherwise tokenize the raw query.
pub fn resolve_keywords(query: &str, slots: Option<&IntentSlots>) -> KeywordSource {
    let structured = slots.map(keywords_from_slots).unwrap_or_default();
    if !structured.is_empty() {
        return KeywordSource::Intent(structured);
    }

    KeywordSource::Fallback(tokenize(query))
}
