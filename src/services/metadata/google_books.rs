//! Google Books volumes client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::VolumesResponse;
use super::{MetadataError, VolumeLookup};
use crate::config::LookupConfig;

/// Queries `<endpoint>?q=isbn:<candidate>`.
#[derive(Clone)]
pub struct GoogleBooksClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(config: &LookupConfig) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn query(&self, isbn: &str) -> Vec<(&'static str, String)> {
        let mut query = vec![("q", format!("isbn:{}", isbn))];
        if let Some(ref key) = self.api_key {
            query.push(("key", key.clone()));
        }
        query
    }
}

#[async_trait]
impl VolumeLookup for GoogleBooksClient {
    async fn lookup(&self, isbn: &str) -> Result<VolumesResponse, MetadataError> {
        tracing::debug!("Looking up isbn:{} at {}", isbn, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(isbn))
            .send()
            .await?;

        // Read as text so a non-JSON body is reported as malformed, not as HTTP.
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MetadataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_volumes_response(&body)
    }
}

/// Parse a volumes search body.
pub fn parse_volumes_response(body: &str) -> Result<VolumesResponse, MetadataError> {
    serde_json::from_str(body)
        .map_err(|e| MetadataError::MalformedResponse(format!("invalid JSON: {}", e)))
}
