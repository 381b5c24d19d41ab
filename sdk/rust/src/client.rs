//! Client for the Plant Database API.

use std::fmt;

use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope returned by the filter and query endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub count: usize,
    pub total_matches: usize,
    pub response_format: String,
    pub debug_signature: String,
    pub filters_applied: Value,
    pub plants: Vec<Value>,
}

/// An error reply from the API, or a transport failure.
#[derive(Debug)]
pub enum GardenError {
    Api {
        status: u16,
        kind: String,
        message: String,
    },
    Transport(reqwest::Error),
    InvalidUrl(String),
}

impl GardenError {
    /// The API's error kind, e.g. `invalid_operator`.
    pub fn kind(&self) -> Option<&str> {
        match self {
            GardenError::Api { kind, .. } => Some(kind),
            GardenError::Transport(_) | GardenError::InvalidUrl(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GardenError::Api { status, .. } => Some(*status),
            GardenError::Transport(e) => e.status().map(|s| s.as_u16()),
            GardenError::InvalidUrl(_) => None,
        }
    }
}

impl fmt::Display for GardenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GardenError::Api {
                status,
                kind,
                message,
            } => write!(f, "API returned {} ({}): {}", status, kind, message),
            GardenError::Transport(e) => write!(f, "request failed: {}", e),
            GardenError::InvalidUrl(url) => write!(f, "invalid URL: {}", url),
        }
    }
}

impl std::error::Error for GardenError {}

impl From<reqwest::Error> for GardenError {
    fn from(e: reqwest::Error) -> Self {
        GardenError::Transport(e)
    }
}

pub struct GardenClient {
    client: Client,
    base_url: String,
}

impl GardenClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/plants/{key}` with the key escaped as one path segment.
    fn plant_url(&self, key: &str) -> Result<Url, GardenError> {
        let base = self.url("/api/plants");
        let mut url = Url::parse(&base).map_err(|_| GardenError::InvalidUrl(base.clone()))?;
        url.path_segments_mut()
            .map_err(|_| GardenError::InvalidUrl(base))?
            .push(key);
        Ok(url)
    }

    async fn send<T: for<'de> Deserialize<'de>>(&self, request: RequestBuilder) -> Result<T, GardenError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            return Err(GardenError::Api {
                status: status.as_u16(),
                kind: body["error"].as_str().unwrap_or("unknown").to_string(),
                message: body["message"].as_str().unwrap_or_default().to_string(),
            });
        }
        Ok(resp.json().await?)
    }

    pub async fn health(&self) -> Result<Value, GardenError> {
        self.send(self.client.get(self.url("/health"))).await
    }

    /// List plants, optionally searching names and descriptions.
    pub async fn list_plants(&self, search: Option<&str>) -> Result<Value, GardenError> {
        let mut request = self.client.get(self.url("/api/plants"));
        if let Some(q) = search {
            request = request.query(&[("q", q)]);
        }
        self.send(request).await
    }

    /// Fetch one plant by ID or name.
    pub async fn plant(&self, key: &str) -> Result<Value, GardenError> {
        let url = self.plant_url(key)?;
        self.send(self.client.get(url)).await
    }

    pub async fn create_plant(&self, plant: &Value) -> Result<Value, GardenError> {
        self.send(self.client.post(self.url("/api/plants")).json(plant)).await
    }

    pub async fn update_plant(&self, key: &str, changes: &Value) -> Result<Value, GardenError> {
        let url = self.plant_url(key)?;
        self.send(self.client.put(url).json(changes)).await
    }

    pub async fn locations(&self) -> Result<Value, GardenError> {
        self.send(self.client.get(self.url("/api/locations"))).await
    }

    pub async fn containers(&self) -> Result<Value, GardenError> {
        self.send(self.client.get(self.url("/api/containers"))).await
    }

    /// Simple filter, e.g. `[("location", "patio"), ("container_size", "large")]`.
    pub async fn filter(&self, params: &[(&str, &str)]) -> Result<QueryResponse, GardenError> {
        let request = self.client.get(self.url("/api/garden/filter")).query(params);
        self.send(request).await
    }

    /// Advanced query with a full JSON body.
    pub async fn query(&self, body: &Value) -> Result<QueryResponse, GardenError> {
        self.send(self.client.post(self.url("/api/garden/query")).json(body)).await
    }

    /// Tables, fields, operators and formats the query endpoint accepts.
    pub async fn fields(&self) -> Result<Value, GardenError> {
        self.send(self.client.get(self.url("/api/garden/fields"))).await
    }
}
