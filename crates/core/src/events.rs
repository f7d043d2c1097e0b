//! Trigger payloads and the response envelope shared by both handlers.

use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Object-storage notification. Only the fields the indexer reads are modeled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageRecord {
    #[serde(default)]
    pub s3: StorageEntity,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageEntity {
    #[serde(default)]
    pub bucket: BucketRef,
    #[serde(default)]
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectRef {
    pub key: Option<String>,
}

/// Bucket and still URL-encoded key of the first record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub encoded_key: String,
}

impl StorageEvent {
    pub fn first_object(&self) -> Result<ObjectLocation, IndexError> {
        let record = self
            .records
            .first()
            .ok_or_else(|| IndexError::InvalidEvent("event carries no records".to_string()))?;

        let bucket = record
            .s3
            .bucket
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| IndexError::InvalidEvent("record has no bucket name".to_string()))?;
        let encoded_key = record
            .s3
            .object
            .key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| IndexError::InvalidEvent("record has no object key".to_string()))?;

        Ok(ObjectLocation {
            bucket,
            encoded_key,
        })
    }
}

/// Decodes a notification key: `+` stands for a space, then percent escapes.
/// Invalid UTF-8 sequences become U+FFFD.
pub fn decode_object_key(encoded: &str) -> String {
    let spaced = encoded.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// HTTP proxy request; only the query string is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpRequest {
    #[serde(rename = "queryStringParameters", default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl HttpRequest {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query_string_parameters: Some(HashMap::from([("q".to_string(), query.into())])),
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get("q"))
            .map(String::as_str)
    }
}

pub const CORS_ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ResponseEnvelope {
    pub fn json(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            body: body.to_string(),
        }
    }

    pub fn with_cors(mut self) -> Self {
        for (name, value) in [
            ("Access-Control-Allow-Origin", "*"),
            ("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS),
            ("Access-Control-Allow-Methods", "GET,OPTIONS"),
            ("Content-Type", "application/json"),
        ] {
            self.headers.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
