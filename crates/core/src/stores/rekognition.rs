use crate::config::LabelSettings;
use crate::traits::LabelDetector;
use crate::{DetectedLabel, StoreError};
use async_trait::async_trait;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::types::{Image, S3Object};
use aws_sdk_rekognition::Client;

pub struct RekognitionLabelDetector {
    client: Client,
    settings: LabelSettings,
}

impl RekognitionLabelDetector {
    pub fn new(client: Client, settings: LabelSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl LabelDetector for RekognitionLabelDetector {
    async fn detect_labels(&self, bucket: &str, key: &str) -> Result<Vec<DetectedLabel>, StoreError> {
        let image = Image::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(key).build())
            .build();

        let output = self
            .client
            .detect_labels()
            .image(image)
            .max_labels(self.settings.max_labels)
            .min_confidence(self.settings.min_confidence)
            .send()
            .await
            .map_err(|error| {
                StoreError::service("rekognition", DisplayErrorContext(&error).to_string())
            })?;

        Ok(output
            .labels()
            .iter()
            .filter_map(|label| {
                label.name().map(|name| DetectedLabel {
                    name: name.to_string(),
                    confidence: label.confidence().unwrap_or_default(),
                })
            })
            .collect())
    }
}
