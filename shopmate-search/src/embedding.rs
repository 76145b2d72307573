//! Embedding client for a hosted OpenAI embeddings deployment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use shopmate_core::config::OpenAiSettings;

use crate::error::{Result, SearchError};

/// API version used by the offline indexer's embedding calls.
pub const INDEXER_API_VERSION: &str = "2024-03-01-preview";

/// API version used by the search wrapper's query embedding calls.
///
/// Pinned independently of [`INDEXER_API_VERSION`]; the indexer and the
/// query path each carry their own version.
pub const QUERY_API_VERSION: &str = "2023-05-15";

/// A provider that generates vector embeddings from text input.
///
/// The hosted client implements this; tests substitute fakes.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// An [`Embedder`] backed by a hosted OpenAI embeddings deployment.
///
/// Posts to
/// `{endpoint}/openai/deployments/{model}/embeddings?api-version={version}`
/// with the service key in the `api-key` header, and consumes
/// `data[0].embedding` from the response.
pub struct EmbeddingClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl EmbeddingClient {
    /// Create a client for the embedding deployment in `settings`, pinned to
    /// the given API version.
    pub fn new(settings: &OpenAiSettings, api_version: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            deployment: settings.embedding_model.clone(),
            api_version: api_version.to_string(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    fn map_err(&self, message: impl Into<String>) -> SearchError {
        SearchError::Embedding { deployment: self.deployment.clone(), message: message.into() }
    }
}

// ── Embeddings API request/response types ──────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(deployment = %self.deployment, text_len = text.len(), "embedding text");

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.api_key)
            .json(&EmbeddingRequest { input: text })
            .send()
            .await
            .map_err(|e| {
                error!(deployment = %self.deployment, error = %e, "embedding request failed");
                self.map_err(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(deployment = %self.deployment, %status, "embedding API error");
            return Err(self.map_err(format!("API returned {status}: {body}")));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(deployment = %self.deployment, error = %e, "failed to parse embedding response");
            self.map_err(format!("failed to parse response: {e}"))
        })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| self.map_err("API returned empty response"))
    }
}
