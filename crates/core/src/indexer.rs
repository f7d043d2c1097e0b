use crate::events::{decode_object_key, ResponseEnvelope, StorageEvent};
use crate::labels::{custom_labels, merge_labels};
use crate::traits::{LabelDetector, ObjectStore, PhotoIndex};
use crate::{IndexError, IndexedPhoto, PhotoDocument};
use serde_json::json;
use tracing::{debug, error, info, warn};

/// Labels a newly stored photo and writes it into the photo index.
pub struct PhotoIndexer<O, L, I>
where
    O: ObjectStore,
    L: LabelDetector,
    I: PhotoIndex,
{
    objects: O,
    detector: L,
    index: I,
}

impl<O, L, I> PhotoIndexer<O, L, I>
where
    O: ObjectStore + Send + Sync,
    L: LabelDetector + Send + Sync,
    I: PhotoIndex + Send + Sync,
{
    pub fn new(objects: O, detector: L, index: I) -> Self {
        Self {
            objects,
            detector,
            index,
        }
    }

    pub async fn handle(&self, event: &StorageEvent) -> ResponseEnvelope {
        let outcome = match event.first_object() {
            Ok(location) => self.index_object(&location.bucket, &location.encoded_key).await,
            Err(error) => Err(error),
        };

        match outcome {
            Ok(indexed) => ResponseEnvelope::json(
                200,
                &json!({
                    "message": "Photo indexed successfully",
                    "objectKey": indexed.object_key,
                    "labels": indexed.labels,
                }),
            ),
            Err(error) => {
                error!(%error, "photo indexing failed");
                ResponseEnvelope::json(
                    500,
                    &json!({
                        "message": "Failed to index photo",
                        "error": error.to_string(),
                    }),
                )
            }
        }
    }

    pub async fn index_object(
        &self,
        bucket: &str,
        encoded_key: &str,
    ) -> Result<IndexedPhoto, IndexError> {
        let key = decode_object_key(encoded_key);
        self.index_key(bucket, &key).await
    }

    /// Runs the pipeline for an already decoded key.
    pub async fn index_key(&self, bucket: &str, key: &str) -> Result<IndexedPhoto, IndexError> {
        info!(bucket, key, "processing image");

        let metadata = self
            .objects
            .head_object(bucket, key)
            .await
            .map_err(|source| IndexError::ObjectUnavailable {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source,
            })?;
        debug!(
            content_type = ?metadata.content_type,
            content_length = ?metadata.content_length,
            "object metadata"
        );

        let custom = custom_labels(&metadata);
        let detected = self
            .detector
            .detect_labels(bucket, key)
            .await
            .map_err(IndexError::LabelDetection)?;
        debug!(?detected, ?custom, "labels collected");

        let labels = merge_labels(&detected, custom);
        let document = PhotoDocument::new(bucket, key, labels);

        self.index
            .upsert_photo(&document)
            .await
            .map_err(IndexError::Index)?;
        info!(key, labels = ?document.labels, "photo indexed");

        match self.index.get_photo(key).await {
            Ok(Some(stored)) => debug!(?stored, "verified indexed document"),
            Ok(None) => warn!(key, "indexed document not visible on read back"),
            Err(error) => warn!(key, %error, "read back of indexed document failed"),
        }

        Ok(IndexedPhoto {
            object_key: document.object_key,
            labels: document.labels,
        })
    }
}
