//! Client for the hosted search index REST surface.
//!
//! Exposes product lookup by key, combined keyword + vector search, related
//! and recommended product queries, and the index management operations used
//! by the offline indexer (existence check, create, bulk upsert).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use shopmate_core::config::{OpenAiSettings, SearchSettings};
use shopmate_core::types::{Product, SearchOptions};

use crate::embedding::{Embedder, EmbeddingClient, QUERY_API_VERSION};
use crate::error::{Result, SearchError};
use crate::schema::{IndexDefinition, VECTOR_FIELD};

/// API version for index management, upsert, and query requests.
pub const SEARCH_API_VERSION: &str = "2024-03-01-preview";

/// Fields consulted by the keyword component of a combined search.
const SEARCH_FIELDS: &str = "name,description,features,category,keywords";

/// Fields returned by search queries.
const SELECT_FIELDS: &str = "id,name,description,price,category,url";

/// Default nearest-neighbor count for vector queries.
const DEFAULT_KNN: usize = 10;

/// A client for one hosted search index.
///
/// Holds its own [`EmbeddingClient`] (pinned to [`QUERY_API_VERSION`]) for
/// computing query embeddings. All failures are logged and returned as typed
/// [`SearchError`] values; there is no fallback, caching, or retry.
pub struct SearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    index_name: String,
    embedder: EmbeddingClient,
}

// ── Search REST request/response types ─────────────────────────────

#[derive(Serialize)]
struct VectorQuery {
    kind: &'static str,
    vector: Vec<f32>,
    k: usize,
    fields: &'static str,
}

impl VectorQuery {
    fn new(vector: Vec<f32>, k: usize) -> Self {
        Self { kind: "vector", vector, k, fields: VECTOR_FIELD }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_fields: Option<&'static str>,
    select: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    #[serde(rename = "orderby", skip_serializing_if = "Option::is_none")]
    order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vector_queries: Vec<VectorQuery>,
}

#[derive(Deserialize)]
struct QueryResponse {
    value: Vec<Product>,
}

#[derive(Serialize)]
struct UpsertRequest {
    value: Vec<Value>,
}

impl SearchClient {
    /// Create a client for the index in `search`, embedding queries through
    /// the deployment in `openai`.
    pub fn new(search: &SearchSettings, openai: &OpenAiSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: search.endpoint.trim_end_matches('/').to_string(),
            api_key: search.api_key.clone(),
            index_name: search.index_name.clone(),
            embedder: EmbeddingClient::new(openai, QUERY_API_VERSION),
        }
    }

    /// The name of the index this client targets.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn index_url(&self) -> String {
        format!(
            "{}/indexes/{}?api-version={}",
            self.endpoint, self.index_name, SEARCH_API_VERSION
        )
    }

    fn docs_url(&self, suffix: &str) -> String {
        format!(
            "{}/indexes/{}/docs{}?api-version={}",
            self.endpoint, self.index_name, suffix, SEARCH_API_VERSION
        )
    }

    fn map_err(operation: &str, message: impl Into<String>) -> SearchError {
        SearchError::Index { operation: operation.to_string(), message: message.into() }
    }

    // ── Lookup and queries ─────────────────────────────────────────

    /// Fetch a product by its document key.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NotFound`] when no document has the key, and
    /// [`SearchError::Index`] for any other upstream failure.
    pub async fn product_by_id(&self, id: &str) -> Result<Product> {
        let url = self.docs_url(&format!("('{id}')"));
        let response = self
            .client
            .get(url)
            .header("api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                error!(product_id = id, error = %e, "product lookup request failed");
                Self::map_err("lookup", format!("request failed: {e}"))
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(product_id = id, "product not found");
            return Err(SearchError::NotFound { id: id.to_string() });
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(product_id = id, %status, "product lookup failed");
            return Err(Self::map_err("lookup", format!("API returned {status}: {body}")));
        }

        response.json().await.map_err(|e| {
            error!(product_id = id, error = %e, "failed to parse product document");
            Self::map_err("lookup", format!("failed to parse response: {e}"))
        })
    }

    /// Combined keyword + vector search over the catalog.
    ///
    /// Embeds `query`, then issues a search restricted to the fixed
    /// searchable/returnable field sets, merging in `options`.
    pub async fn search_products(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<Product>> {
        let embedding = self.embedder.embed(query).await?;

        let request = QueryRequest {
            search: Some(query),
            search_fields: Some(SEARCH_FIELDS),
            select: SELECT_FIELDS,
            filter: options.filter.clone(),
            order_by: options.order_by.as_ref().map(|parts| parts.join(",")),
            top: options.top,
            vector_queries: vec![VectorQuery::new(embedding, options.k.unwrap_or(DEFAULT_KNN))],
        };

        self.execute_query(&request).await
    }

    /// Products related to an existing product, by keyword + vector search
    /// on its name.
    pub async fn related_products(&self, product_id: &str) -> Result<Vec<Product>> {
        let product = self.product_by_id(product_id).await?;
        self.search_products(&product.name, &SearchOptions::top(5)).await
    }

    /// Vector-similarity recommendations from a product's stored vector,
    /// excluding the product itself.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingVector`] when the product document does
    /// not carry a stored vector.
    pub async fn recommended_products(&self, product: &Product, top: usize) -> Result<Vec<Product>> {
        let vector = product
            .vector
            .as_ref()
            .ok_or_else(|| SearchError::MissingVector { id: product.id.clone() })?;

        let request = QueryRequest {
            search: None,
            search_fields: None,
            select: SELECT_FIELDS,
            filter: Some(format!("id ne '{}'", product.id)),
            order_by: None,
            top: None,
            vector_queries: vec![VectorQuery::new(vector.clone(), top)],
        };

        self.execute_query(&request).await
    }

    /// Pure vector search from embedded query text.
    pub async fn similar_products(&self, query: &str, k: usize) -> Result<Vec<Product>> {
        let embedding = self.embedder.embed(query).await?;

        let request = QueryRequest {
            search: None,
            search_fields: None,
            select: SELECT_FIELDS,
            filter: None,
            order_by: None,
            top: None,
            vector_queries: vec![VectorQuery::new(embedding, k)],
        };

        self.execute_query(&request).await
    }

    async fn execute_query(&self, request: &QueryRequest<'_>) -> Result<Vec<Product>> {
        let response = self
            .client
            .post(self.docs_url("/search"))
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "search request failed");
                Self::map_err("search", format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "search query failed");
            return Err(Self::map_err("search", format!("API returned {status}: {body}")));
        }

        let parsed: QueryResponse = response.json().await.map_err(|e| {
            error!(error = %e, "failed to parse search response");
            Self::map_err("search", format!("failed to parse response: {e}"))
        })?;

        debug!(result_count = parsed.value.len(), "search query completed");
        Ok(parsed.value)
    }

    // ── Index management (used by the offline indexer) ─────────────

    /// Create the index from `definition` unless it already exists.
    ///
    /// Returns `true` if a create call was issued, `false` if the index was
    /// already present. Any status other than success or 404 on the
    /// existence check is a typed error.
    pub async fn ensure_index(&self, definition: &IndexDefinition) -> Result<bool> {
        let response = self
            .client
            .get(self.index_url())
            .header("api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                error!(index = %self.index_name, error = %e, "index existence check failed");
                Self::map_err("create", format!("existence check failed: {e}"))
            })?;

        if response.status().is_success() {
            debug!(index = %self.index_name, "index already exists, skipping creation");
            return Ok(false);
        }
        if response.status() != reqwest::StatusCode::NOT_FOUND {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(index = %self.index_name, %status, "index existence check failed");
            return Err(Self::map_err("create", format!("API returned {status}: {body}")));
        }

        let response = self
            .client
            .put(self.index_url())
            .header("api-key", &self.api_key)
            .json(definition)
            .send()
            .await
            .map_err(|e| {
                error!(index = %self.index_name, error = %e, "index create request failed");
                Self::map_err("create", format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(index = %self.index_name, %status, "index create failed");
            return Err(Self::map_err("create", format!("API returned {status}: {body}")));
        }

        debug!(index = %self.index_name, "created index");
        Ok(true)
    }

    /// Bulk-upsert documents, tagging each with the merge-or-upload action.
    pub async fn upsert_documents(&self, docs: &[Value]) -> Result<()> {
        let value = docs
            .iter()
            .map(|doc| {
                let mut tagged = doc
                    .as_object()
                    .cloned()
                    .ok_or_else(|| Self::map_err("upsert", "document is not a JSON object"))?;
                tagged.insert(
                    "@search.action".to_string(),
                    Value::String("mergeOrUpload".to_string()),
                );
                Ok(Value::Object(tagged))
            })
            .collect::<Result<Vec<Value>>>()?;

        let response = self
            .client
            .post(self.docs_url("/index"))
            .header("api-key", &self.api_key)
            .json(&UpsertRequest { value })
            .send()
            .await
            .map_err(|e| {
                error!(index = %self.index_name, error = %e, "upsert request failed");
                Self::map_err("upsert", format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(index = %self.index_name, %status, "upsert failed");
            return Err(Self::map_err("upsert", format!("API returned {status}: {body}")));
        }

        debug!(index = %self.index_name, count = docs.len(), "upserted documents");
        Ok(())
    }
}
