pub mod config;
pub mod error;
pub mod events;
pub mod indexer;
pub mod keywords;
pub mod labels;
pub mod models;
pub mod orchestrator;
pub mod stores;
pub mod traits;

pub use config::{IntentSettings, LabelSettings, OpenSearchSettings, SearchSettings};
pub use error::{IndexError, StoreError};
pub use events::{decode_object_key, HttpRequest, ObjectLocation, ResponseEnvelope, StorageEvent};
pub use indexer::PhotoIndexer;
pub use keywords::{resolve_keywords, tokenize, STOPWORDS};
pub use labels::{merge_labels, parse_custom_labels, CUSTOM_LABELS_FIELD};
pub use models::{
    DetectedLabel, IndexedPhoto, IntentSlots, KeywordSource, ObjectMetadata, PhotoDocument,
    PhotoHit,
};
pub use orchestrator::{SearchCoordinator, SearchOutcome};
pub use stores::{LexIntentExtractor, OpenSearchStore, RekognitionLabelDetector, S3ObjectStore};
pub use traits::{IntentExtractor, LabelDetector, ObjectStore, PhotoIndex};
