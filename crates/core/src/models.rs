use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Document stored in the photo index. The object key doubles as document id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDocument {
    pub object_key: String,
    pub bucket: String,
    pub created_timestamp: DateTime<Utc>,
    pub labels: Vec<String>,
}

impl PhotoDocument {
    pub fn new(bucket: impl Into<String>, object_key: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            object_key: object_key.into(),
            bucket: bucket.into(),
            created_timestamp: Utc::now(),
            labels,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.object_key
    }
}

/// A search hit as returned to callers.
///
/// `created_timestamp` is passed through verbatim because documents written by
/// older producers carry naive timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoHit {
    pub url: String,
    pub labels: Vec<String>,
    pub object_key: String,
    pub bucket: String,
    pub created_timestamp: String,
}

impl PhotoHit {
    pub fn public_url(bucket: &str, object_key: &str) -> String {
        let path = object_key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("https://{bucket}.s3.amazonaws.com/{path}")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub content_length: Option<i64>,
    pub custom: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLabel {
    pub name: String,
    pub confidence: f32,
}

/// Slot values recognised by the intent service, keyed by slot name.
/// Unfilled slots are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentSlots {
    values: HashMap<String, String>,
}

impl IntentSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Where the final keyword list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordSource {
    Intent(Vec<String>),
    Fallback(Vec<String>),
}

impl KeywordSource {
    pub fn keywords(&self) -> &[String] {
        match self {
            Self::Intent(keywords) | Self::Fallback(keywords) => keywords,
        }
    }

    pub fn into_keywords(self) -> Vec<String> {
        match self {
            Self::Intent(keywords) | Self::Fallback(keywords) => keywords,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedPhoto {
    pub object_key: String,
    pub labels: Vec<String>,
}
