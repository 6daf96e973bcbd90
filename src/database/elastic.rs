use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::config::StoreConfig;
use crate::filter::Filter;

use super::store::{DocumentStore, Hit, StoreError, WriteOutcome, WriteResult};

/// Elasticsearch REST client. Cheap to clone; the inner `reqwest::Client`
/// pools connections.
#[derive(Clone)]
pub struct ElasticsearchStore {
    client: Client,
    base: Url,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    #[serde(rename = "_id")]
    id: String,
    result: WriteResult,
}

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    deleted: u64,
}

impl ElasticsearchStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut base = Url::parse(&config.url).map_err(|e| StoreError::InvalidUrl(format!("{}: {}", config.url, e)))?;
        // Url::join replaces the last segment unless the path ends with a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base
            .join(path)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(&self, builder: RequestBuilder) -> Result<T, StoreError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Elasticsearch returned {}: {}", status, body);
            return Err(StoreError::Status { status: status.as_u16(), body });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for ElasticsearchStore {
    async fn search(&self, filter: &Filter) -> Result<Vec<Hit>, StoreError> {
        let mut url = self.endpoint(&format!("{}/_search", filter.index()))?;
        url.query_pairs_mut().append_pair("ignore_unavailable", "true");
        let body = filter.to_search_body();
        debug!(index = filter.index(), query = %body, "search");

        let response: SearchResponse = self.send_json(self.request(Method::POST, url).json(&body)).await?;
        Ok(response
            .hits
            .hits
            .into_iter()
            .map(|raw| Hit::new(raw.id, raw.source))
            .collect())
    }

    async fn index(&self, index: &str, document: Map<String, Value>) -> Result<WriteOutcome, StoreError> {
        let url = self.endpoint(&format!("{}/_doc", index))?;
        debug!(index, "index document");
        let response: WriteResponse = self.send_json(self.request(Method::POST, url).json(&document)).await?;
        Ok(WriteOutcome { id: response.id, result: response.result })
    }

    async fn update(&self, index: &str, id: &str, partial: Map<String, Value>) -> Result<WriteOutcome, StoreError> {
        let mut url = self.endpoint(&format!("{}/_update/", index))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(id);
        url.query_pairs_mut().append_pair("refresh", "true");
        debug!(index, id, "update document");

        let response = self
            .request(Method::POST, url)
            .json(&json!({ "doc": partial }))
            .send()
            .await?;

        // A missing document is an outcome, not a failure
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(WriteOutcome { id: id.to_string(), result: WriteResult::NotFound });
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("Elasticsearch update returned {}: {}", status, body);
            return Err(StoreError::Status { status, body });
        }
        let parsed: WriteResponse = response.json().await.map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(WriteOutcome { id: parsed.id, result: parsed.result })
    }

    async fn delete_by_query(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut url = self.endpoint(&format!("{}/_delete_by_query", filter.index()))?;
        url.query_pairs_mut()
            .append_pair("refresh", "true")
            .append_pair("ignore_unavailable", "true");
        let body = json!({ "query": filter.to_query_json() });
        debug!(index = filter.index(), query = %body, "delete by query");

        let response: DeleteByQueryResponse = self.send_json(self.request(Method::POST, url).json(&body)).await?;
        Ok(response.deleted)
    }

    async fn refresh(&self, index: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("{}/_refresh", index))?;
        let _: Value = self.send_json(self.request(Method::POST, url)).await?;
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        let url = self.endpoint(index)?;
        let response = self.request(Method::HEAD, url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(StoreError::Status { status: other.as_u16(), body: String::new() }),
        }
    }

    async fn create_index(&self, index: &str, settings: Value) -> Result<(), StoreError> {
        let url = self.endpoint(index)?;
        let _: Value = self.send_json(self.request(Method::PUT, url).json(&settings)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = self.base.clone();
        let _: Value = self.send_json(self.request(Method::GET, url)).await?;
        Ok(())
    }
}
