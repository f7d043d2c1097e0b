use crate::config::SearchSettings;
use crate::events::{HttpRequest, ResponseEnvelope};
use crate::keywords::resolve_keywords;
use crate::traits::{IntentExtractor, PhotoIndex};
use crate::{IntentSlots, KeywordSource, PhotoHit};
use serde_json::json;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<PhotoHit>,
    pub message: String,
}

impl SearchOutcome {
    fn empty(message: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            message: message.into(),
        }
    }

    pub fn into_response(self) -> ResponseEnvelope {
        ResponseEnvelope::json(
            200,
            &json!({
                "results": self.results,
                "message": self.message,
            }),
        )
        .with_cors()
    }
}

/// Turns free-text queries into label searches against the photo index.
pub struct SearchCoordinator<X, I>
where
    X: IntentExtractor,
    I: PhotoIndex,
{
    intent: X,
    index: I,
    settings: SearchSettings,
}

impl<X, I> SearchCoordinator<X, I>
where
    X: IntentExtractor + Send + Sync,
    I: PhotoIndex + Send + Sync,
{
    pub fn new(intent: X, index: I, settings: SearchSettings) -> Self {
        Self {
            intent,
            index,
            settings,
        }
    }

    pub async fn handle(&self, request: &HttpRequest) -> ResponseEnvelope {
        self.search(request.query()).await.into_response()
    }

    pub async fn search(&self, query: Option<&str>) -> SearchOutcome {
        let query = query.map(str::trim).unwrap_or_default();
        info!(query, "search requested");

        if query.is_empty() {
            return SearchOutcome::empty("No query provided");
        }

        let slots = self.structured_slots(query).await;
        let source = resolve_keywords(query, slots.as_ref());
        match &source {
            KeywordSource::Intent(keywords) => debug!(?keywords, "keywords from intent slots"),
            KeywordSource::Fallback(keywords) => {
                debug!(?keywords, "intent gave no keywords, tokenized raw query")
            }
        }

        let keywords = source.into_keywords();
        if keywords.is_empty() {
            return SearchOutcome::empty(format!("No keywords found in query: {query}"));
        }

        match self
            .index
            .search_labels(&keywords, self.settings.max_results)
            .await
        {
            Ok(results) => {
                info!(count = results.len(), "returning results");
                let message = format!(
                    "Found {} photos matching keywords: {}",
                    results.len(),
                    keywords.join(",")
                );
                SearchOutcome { results, message }
            }
            Err(error) => {
                warn!(%error, "opensearch query failed");
                SearchOutcome::empty(format!("Error searching OpenSearch: {error}"))
            }
        }
    }

    /// Intent stage: any service failure degrades to `None`.
    async fn structured_slots(&self, query: &str) -> Option<IntentSlots> {
        match self.intent.extract_slots(query).await {
            Ok(slots) => {
                debug!(?slots, "intent service response");
                slots
            }
            Err(error) => {
                warn!(%error, "intent extraction failed, falling back to raw query");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::PRIMARY_SLOT;
    use crate::{PhotoDocument, StoreError};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    enum IntentBehaviour {
        Slots(IntentSlots),
        NoIntent,
        Fails,
    }

    struct FakeIntent {
        behaviour: IntentBehaviour,
    }

    #[async_trait]
    impl IntentExtractor for FakeIntent {
        async fn extract_slots(&self, _text: &str) -> Result<Option<IntentSlots>, StoreError> {
            match &self.behaviour {
                IntentBehaviour::Slots(slots) => Ok(Some(slots.clone())),
                IntentBehaviour::NoIntent => Ok(None),
                IntentBehaviour::Fails => Err(StoreError::service("lex", "AccessDenied")),
            }
        }
    }

    #[derive(Default)]
    struct FakeIndex {
        hits: Vec<PhotoHit>,
        fail: bool,
        calls: Mutex<Vec<(Vec<String>, usize)>>,
    }

    #[async_trait]
    impl PhotoIndex for FakeIndex {
        async fn upsert_photo(&self, _document: &PhotoDocument) -> Result<(), StoreError> {
            Ok(())
        }

        async fn get_photo(&self, _object_key: &str) -> Result<Option<PhotoDocument>, StoreError> {
            Ok(None)
        }

        async fn search_labels(
            &self,
            keywords: &[String],
            max_results: usize,
        ) -> Result<Vec<PhotoHit>, StoreError> {
            self.calls
                .lock()
                .expect("lock")
                .push((keywords.to_vec(), max_results));
            if self.fail {
                return Err(StoreError::Request("connection refused".to_string()));
            }
            Ok(self.hits.clone())
        }
    }

    fn hit(key: &str, labels: &[&str]) -> PhotoHit {
        PhotoHit {
            url: PhotoHit::public_url("photo-bucket", key),
            labels: labels.iter().map(|label| label.to_string()).collect(),
            object_key: key.to_string(),
            bucket: "photo-bucket".to_string(),
            created_timestamp: "2024-05-01T10:00:00+00:00".to_string(),
        }
    }

    fn coordinator(behaviour: IntentBehaviour, index: FakeIndex) -> SearchCoordinator<FakeIntent, FakeIndex> {
        SearchCoordinator::new(FakeIntent { behaviour }, index, SearchSettings::default())
    }

    #[tokio::test]
    async fn blank_query_never_reaches_the_index() {
        let coordinator = coordinator(IntentBehaviour::NoIntent, FakeIndex::default());

        for query in [None, Some(""), Some("   ")] {
            let outcome = coordinator.search(query).await;
            assert!(outcome.results.is_empty());
            assert_eq!(outcome.message, "No query provided");
        }
        assert!(coordinator.index.calls.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn stopword_only_query_explains_missing_keywords() {
        let coordinator = coordinator(IntentBehaviour::NoIntent, FakeIndex::default());

        let outcome = coordinator.search(Some("show me photos")).await;

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.message, "No keywords found in query: show me photos");
        assert!(coordinator.index.calls.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn intent_failure_falls_back_to_query_tokens() {
        let index = FakeIndex {
            hits: vec![hit("dog.jpg", &["dog"]), hit("cat.jpg", &["cats"])],
            ..FakeIndex::default()
        };
        let coordinator = coordinator(IntentBehaviour::Fails, index);

        let outcome = coordinator.search(Some("show me dogs and cats")).await;

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.message, "Found 2 photos matching keywords: dogs,cats");
        let calls = coordinator.index.calls.lock().expect("lock");
        assert_eq!(
            calls.as_slice(),
            [(vec!["dogs".to_string(), "cats".to_string()], 100)]
        );
    }

    #[tokio::test]
    async fn slot_keywords_replace_query_tokens() {
        let slots = IntentSlots::new().with_slot(PRIMARY_SLOT, "Mountains");
        let coordinator = coordinator(IntentBehaviour::Slots(slots), FakeIndex::default());

        let outcome = coordinator.search(Some("find pictures of mountains please")).await;

        assert_eq!(outcome.message, "Found 0 photos matching keywords: mountains");
        let calls = coordinator.index.calls.lock().expect("lock");
        assert_eq!(calls[0].0, vec!["mountains".to_string()]);
    }

    #[tokio::test]
    async fn index_errors_become_empty_results() {
        let index = FakeIndex {
            fail: true,
            ..FakeIndex::default()
        };
        let coordinator = coordinator(IntentBehaviour::NoIntent, index);

        let outcome = coordinator.search(Some("trees")).await;

        assert!(outcome.results.is_empty());
        assert_eq!(
            outcome.message,
            "Error searching OpenSearch: request failed: connection refused"
        );
    }

    #[tokio::test]
    async fn handler_wraps_results_in_a_cors_envelope() {
        let index = FakeIndex {
            hits: vec![hit("beach.jpg", &["water", "sky"])],
            ..FakeIndex::default()
        };
        let coordinator = coordinator(IntentBehaviour::NoIntent, index);

        let response = coordinator.handle(&HttpRequest::with_query("water")).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.headers.get("Access-Control-Allow-Origin").map(String::as_str),
            Some("*")
        );
        let body: Value = response.body_json().expect("json body");
        assert_eq!(body["results"][0]["objectKey"], "beach.jpg");
        assert_eq!(
            body["results"][0]["url"],
            "https://photo-bucket.s3.amazonaws.com/beach.jpg"
        );
        assert_eq!(body["message"], "Found 1 photos matching keywords: water");
    }
}
