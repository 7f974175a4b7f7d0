//! Voting-records API client
//!
//! Provides a unified interface over the remote division/member source:
//! - `TvfyClient` talks to the They Vote For You REST API
//! - `InMemorySource` serves fixed records (for tests and offline runs)

use crate::config::{ApiConfig, AppConfig};
use crate::errors::{AppError, Result};
use crate::metrics::FetchMetrics;
use crate::models::{AdditionalInfo, Division, DivisionSummary, RawMember};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Remote source of divisions and members
#[async_trait]
pub trait DivisionSource: Send + Sync {
    /// Most recent page of divisions
    async fn fetch_recent_divisions(&self) -> Result<Vec<DivisionSummary>>;

    /// Full record, including the vote list, for one division
    async fn fetch_division_detail(&self, id: u64) -> Result<Division>;

    /// Every person on the roster
    async fn fetch_members(&self) -> Result<Vec<RawMember>>;

    /// Supplementary stats for one person
    async fn fetch_member_detail(&self, id: u64) -> Result<AdditionalInfo>;
}

/// They Vote For You API client
pub struct TvfyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    retry_budget: Duration,
}

impl TvfyClient {
    /// Create a new client
    pub fn new(config: &ApiConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_budget: config.retry_budget(),
        })
    }

    /// Create a client from application config, requiring an API key
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let key = config.api_key()?.to_string();
        Self::new(&config.api, key)
    }

    /// GET `path` and decode the JSON body, retrying connection failures
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str, path: &str) -> Result<T> {
        if self.retry_budget.is_zero() {
            return self.get_once(endpoint, path).await;
        }

        let policy = ExponentialBackoff {
            max_elapsed_time: Some(self.retry_budget),
            ..Default::default()
        };

        backoff::future::retry(policy, move || async move {
            self.get_once(endpoint, path).await.map_err(|e| {
                if e.is_transient() {
                    warn!(path, error = %e, "Request failed, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
    }

    async fn get_once<T: DeserializeOwned>(&self, endpoint: &'static str, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let metrics = FetchMetrics::start(endpoint);

        let response = match self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                metrics.finish(None);
                return Err(AppError::HttpClient(e.without_url()));
            }
        };

        let status = response.status();
        metrics.finish(Some(status.as_u16()));

        // Report the path only; the full URL carries the API key
        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                url: path.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| AppError::HttpClient(e.without_url()))?;
        debug!(path, bytes = body.len(), "Fetched");

        serde_json::from_slice(&body).map_err(|e| AppError::MalformedRecord {
            record: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl DivisionSource for TvfyClient {
    #[instrument(skip(self))]
    async fn fetch_recent_divisions(&self) -> Result<Vec<DivisionSummary>> {
        self.get_json("/divisions.json", "divisions.json").await
    }

    #[instrument(skip(self))]
    async fn fetch_division_detail(&self, id: u64) -> Result<Division> {
        self.get_json("/divisions/{id}.json", &format!("divisions/{}.json", id))
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_members(&self) -> Result<Vec<RawMember>> {
        self.get_json("/people.json", "people.json").await
    }

    #[instrument(skip(self))]
    async fn fetch_member_detail(&self, id: u64) -> Result<AdditionalInfo> {
        self.get_json("/people/{id}.json", &format!("people/{}.json", id))
            .await
    }
}

/// Fixed in-memory source. Records every call it serves.
#[derive(Default)]
pub struct InMemorySource {
    summaries: Vec<DivisionSummary>,
    divisions: HashMap<u64, Division>,
    people: Vec<RawMember>,
    person_details: HashMap<u64, AdditionalInfo>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `division` from both the list page and its detail route
    pub fn with_division(mut self, division: Division) -> Self {
        self.summaries.push(division.header.clone());
        self.divisions.insert(division.id(), division);
        self
    }

    /// Serve `person`, and `detail` from its detail route if given
    pub fn with_person(mut self, person: RawMember, detail: Option<AdditionalInfo>) -> Self {
        if let (Some(id), Some(detail)) = (person.id, detail) {
            self.person_details.insert(id, detail);
        }
        self.people.push(person);
        self
    }

    /// Make `path` (e.g. `divisions/7.json`) answer with a 500
    pub fn failing(mut self, path: impl Into<String>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Paths requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn serve<T: Clone>(&self, path: String, value: Option<&T>) -> Result<T> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(path.clone());
        }
        if self.failing.contains(&path) {
            return Err(AppError::Upstream { status: 500, url: path });
        }
        value
            .cloned()
            .ok_or(AppError::Upstream { status: 404, url: path })
    }
}

#[async_trait]
impl DivisionSource for InMemorySource {
    async fn fetch_recent_divisions(&self) -> Result<Vec<DivisionSummary>> {
        self.serve("divisions.json".into(), Some(&self.summaries))
    }

    async fn fetch_division_detail(&self, id: u64) -> Result<Division> {
        self.serve(format!("divisions/{}.json", id), self.divisions.get(&id))
    }

    async fn fetch_members(&self) -> Result<Vec<RawMember>> {
        self.serve("people.json".into(), Some(&self.people))
    }

    async fn fetch_member_detail(&self, id: u64) -> Result<AdditionalInfo> {
        self.serve(format!("people/{}.json", id), self.person_details.get(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn division(id: u64) -> Division {
        serde_json::from_value(json!({
            "id": id,
            "house": "representatives",
            "name": "Documents - Tabling",
            "date": "2024-05-14"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_source_serves_and_logs() {
        let source = InMemorySource::new()
            .with_division(division(1))
            .with_division(division(2))
            .failing("divisions/2.json");

        let page = source.fetch_recent_divisions().await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(source.fetch_division_detail(1).await.unwrap().id(), 1);

        let err = source.fetch_division_detail(2).await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(500));

        let err = source.fetch_member_detail(77).await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(404));

        assert_eq!(
            source.calls(),
            vec!["divisions.json", "divisions/1.json", "divisions/2.json", "people/77.json"]
        );
    }

    #[test]
    fn test_client_requires_api_key() {
        let mut config = AppConfig::default();
        config.api.key = None;
        assert!(TvfyClient::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_connection_failure_is_reported_without_key() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            retry_max_elapsed_secs: 0,
            ..ApiConfig::default()
        };
        let client = TvfyClient::new(&config, "secret-key".into()).unwrap();

        let err = client.fetch_recent_divisions().await.unwrap_err();
        assert!(matches!(err, AppError::HttpClient(_)));
        assert!(err.is_transient());
        assert!(!err.to_string().contains("secret-key"));
    }
}
