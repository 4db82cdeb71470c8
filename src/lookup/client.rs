//! HTTP implementation of the theatre lookup

use super::{LookupError, LookupResult, TheatreId, TheatreLookup, TheatreRecord};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Talks to the REST service exposing `/theaters` and `/theaters/{id}`
#[derive(Debug, Clone)]
pub struct HttpTheatreLookup {
    client: Client,
    base_url: String,
    request_timeout: Option<Duration>,
}

impl HttpTheatreLookup {
    /// Create a client rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> LookupResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: None,
        })
    }

    /// Give up on requests that take longer than `request_timeout`
    pub fn with_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn theatre_url(&self, id: &TheatreId) -> String {
        format!("{}/theaters/{}", self.base_url, id)
    }

    fn theatres_url(&self) -> String {
        format!("{}/theaters", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> LookupResult<T> {
        debug!("GET {}", url);
        let request = self.get_json_inner(url);

        match self.request_timeout {
            Some(limit) => timeout(limit, request)
                .await
                .map_err(|_| LookupError::TimeoutError(limit))?,
            None => request.await,
        }
    }

    async fn get_json_inner<T: DeserializeOwned>(&self, url: String) -> LookupResult<T> {
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl TheatreLookup for HttpTheatreLookup {
    async fn fetch_theatre(&self, id: &TheatreId) -> LookupResult<TheatreRecord> {
        self.get_json(self.theatre_url(id)).await
    }

    async fn list_theatres(&self) -> LookupResult<Vec<TheatreRecord>> {
        self.get_json(self.theatres_url()).await
    }
}

/// Build a status error, keeping the service's `{"error": ...}` message when present
async fn status_error(response: Response) -> LookupError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

    LookupError::StatusError { status, message }
}
