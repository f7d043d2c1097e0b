pub mod lex;
pub mod opensearch;
pub mod rekognition;
pub mod s3;

pub use lex::LexIntentExtractor;
pub use opensearch::OpenSearchStore;
pub use rekognition::RekognitionLabelDetector;
pub use s3::S3ObjectStore;
