use crate::traits::ObjectStore;
use crate::{ObjectMetadata, StoreError};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StoreError> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| StoreError::service("s3", DisplayErrorContext(&error).to_string()))?;

        Ok(ObjectMetadata {
            content_type: output.content_type().map(str::to_string),
            content_length: output.content_length(),
            custom: output.metadata().cloned().unwrap_or_default(),
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        let custom = (!metadata.custom.is_empty()).then(|| metadata.custom.clone());

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .set_content_type(metadata.content_type.clone())
            .set_metadata(custom)
            .send()
            .await
            .map_err(|error| StoreError::service("s3", DisplayErrorContext(&error).to_string()))?;

        Ok(())
    }
}
