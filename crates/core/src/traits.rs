use crate::{DetectedLabel, IntentSlots, ObjectMetadata, PhotoDocument, PhotoHit, StoreError};
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StoreError>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait LabelDetector {
    async fn detect_labels(&self, bucket: &str, key: &str) -> Result<Vec<DetectedLabel>, StoreError>;
}

#[async_trait]
pub trait IntentExtractor {
    /// `Ok(None)` when the service answered without a recognised intent.
    async fn extract_slots(&self, text: &str) -> Result<Option<IntentSlots>, StoreError>;
}

#[async_trait]
pub trait PhotoIndex {
    async fn upsert_photo(&self, document: &PhotoDocument) -> Result<(), StoreError>;

    async fn get_photo(&self, object_key: &str) -> Result<Option<PhotoDocument>, StoreError>;

    async fn search_labels(
        &self,
        keywords: &[String],
        max_results: usize,
    ) -> Result<Vec<PhotoHit>, StoreError>;
}
