use crate::config::OpenSearchSettings;
use crate::traits::PhotoIndex;
use crate::{PhotoDocument, PhotoHit, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

pub struct OpenSearchStore {
    client: Client,
    endpoint: Url,
    index_name: String,
    credentials: Option<(String, Option<String>)>,
}

impl OpenSearchStore {
    pub fn new(settings: &OpenSearchSettings) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let credentials = settings
            .username
            .clone()
            .filter(|username| !username.is_empty())
            .map(|username| (username, settings.password.clone()));

        Ok(Self {
            client,
            endpoint: Url::parse(&settings.endpoint)?,
            index_name: settings.index_name.clone(),
            credentials,
        })
    }

    /// `{endpoint}/{index}/{segments...}` with every segment escaped, so keys
    /// containing `/` stay a single path segment.
    fn index_url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Request(format!("endpoint {} cannot be a base", self.endpoint)))?
            .pop_if_empty()
            .push(&self.index_name)
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((username, password)) => request.basic_auth(username, password.as_ref()),
            None => request,
        }
    }
}

#[async_trait]
impl PhotoIndex for OpenSearchStore {
    async fn upsert_photo(&self, document: &PhotoDocument) -> Result<(), StoreError> {
        let mut url = self.index_url(&["_doc", document.document_id()])?;
        url.query_pairs_mut().append_pair("refresh", "true");

        let response = self
            .authorize(self.client.put(url))
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response.status()));
        }

        let body: Value = response.json().await?;
        debug!(response = %body, "opensearch index response");
        Ok(())
    }

    async fn get_photo(&self, object_key: &str) -> Result<Option<PhotoDocument>, StoreError> {
        let url = self.index_url(&["_doc", object_key])?;
        let response = self.authorize(self.client.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(backend_error(response.status()));
        }

        let body: Value = response.json().await?;
        match body.get("_source") {
            Some(source) => Ok(Some(serde_json::from_value(source.clone())?)),
            None => Ok(None),
        }
    }

    async fn search_labels(
        &self,
        keywords: &[String],
        max_results: usize,
    ) -> Result<Vec<PhotoHit>, StoreError> {
        let body = build_label_query(keywords, max_results);
        debug!(query = %body, "opensearch query");

        let url = self.index_url(&["_search"])?;
        let response = self
            .authorize(self.client.post(url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response.status()));
        }

        let response_json: Value = response.json().await?;
        Ok(parse_hits(&response_json))
    }
}

fn backend_error(status: StatusCode) -> StoreError {
    StoreError::BackendResponse {
        backend: "opensearch".to_string(),
        details: status.to_string(),
    }
}

/// Match-any query over the `labels` field.
pub fn build_label_query(keywords: &[String], max_results: usize) -> Value {
    let should: Vec<Value> = keywords
        .iter()
        .map(|keyword| json!({"match": {"labels": keyword}}))
        .collect();

    json!({
        "size": max_results,
        "query": {
            "bool": {
                "should": should,
                "minimum_should_match": 1
            }
        }
    })
}

pub fn parse_hits(response: &Value) -> Vec<PhotoHit> {
    let hits = response
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut result = Vec::new();

    for raw in hits {
        let source = raw.get("_source").cloned().unwrap_or(Value::Null);
        let bucket = source
            .get("bucket")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let object_key = source
            .get("objectKey")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let created_timestamp = source
            .get("createdTimestamp")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let labels = source
            .get("labels")
            .and_then(Value::as_array)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        result.push(PhotoHit {
            url: PhotoHit::public_url(&bucket, &object_key),
            labels,
            object_key,
            bucket,
            created_timestamp,
        });
    }

    result
}
