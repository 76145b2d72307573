//! Offline catalog indexer.
//!
//! Reads a local JSON catalog, embeds every item one at a time, derives the
//! index schema from the first augmented document, creates the index if
//! absent, and bulk-upserts all documents. Any failure aborts the whole run
//! and propagates; there is no partial-completion tracking, retry, or
//! backoff.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{error, info};

use shopmate_core::config::Settings;

use crate::client::SearchClient;
use crate::embedding::{Embedder, EmbeddingClient, INDEXER_API_VERSION};
use crate::error::{Result, SearchError};
use crate::schema::{VECTOR_FIELD, infer_index_definition};

/// Summary of one indexer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    /// Number of documents upserted.
    pub documents: usize,
    /// Whether the index had to be created.
    pub index_created: bool,
}

/// The offline/batch indexing pipeline.
pub struct Indexer {
    client: SearchClient,
    embedder: EmbeddingClient,
    catalog_path: PathBuf,
}

impl Indexer {
    /// Build an indexer from process settings.
    ///
    /// The indexer carries its own embedding client pinned to
    /// [`INDEXER_API_VERSION`], separate from the search client's query
    /// embedder.
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: SearchClient::new(&settings.search, &settings.openai),
            embedder: EmbeddingClient::new(&settings.openai, INDEXER_API_VERSION),
            catalog_path: PathBuf::from(&settings.catalog_path),
        }
    }

    /// Build an indexer from explicit parts. Used by tests.
    pub fn from_parts(
        client: SearchClient,
        embedder: EmbeddingClient,
        catalog_path: impl Into<PathBuf>,
    ) -> Self {
        Self { client, embedder, catalog_path: catalog_path.into() }
    }

    /// Load the catalog, embed and upsert every item.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Catalog`] for unreadable/malformed catalogs
    /// and propagates the first embedding or upload failure unchanged.
    pub async fn run(&self) -> Result<IndexReport> {
        let items = load_catalog_items(&self.catalog_path)?;
        info!(count = items.len(), path = %self.catalog_path.display(), "loaded catalog");

        let mut docs = Vec::with_capacity(items.len());
        for item in &items {
            docs.push(self.build_document(item).await?);
        }

        let first = docs.first().and_then(Value::as_object).ok_or_else(|| {
            SearchError::Catalog("catalog contains no items to index".to_string())
        })?;
        let definition = infer_index_definition(self.client.index_name(), first);

        let index_created = self.client.ensure_index(&definition).await?;
        self.client.upsert_documents(&docs).await?;

        info!(documents = docs.len(), index_created, "indexed products");
        Ok(IndexReport { documents: docs.len(), index_created })
    }

    /// Augment one catalog item: original fields + numeric price + vector.
    async fn build_document(&self, item: &Value) -> Result<Value> {
        let obj = item.as_object().ok_or_else(|| {
            SearchError::Catalog("catalog item is not a JSON object".to_string())
        })?;

        let text = embedding_text(obj);
        let vector = self.embedder.embed(&text).await.inspect_err(|e| {
            let id = obj.get("id").and_then(Value::as_str).unwrap_or("<unknown>");
            error!(product_id = id, error = %e, "embedding failed during indexing");
        })?;

        let mut doc = obj.clone();
        if let Some(price) = obj.get("price").and_then(price_as_f64) {
            if let Some(number) = serde_json::Number::from_f64(price) {
                doc.insert("price".to_string(), Value::Number(number));
            }
        }
        doc.insert(
            VECTOR_FIELD.to_string(),
            serde_json::to_value(&vector).map_err(|e| {
                SearchError::Catalog(format!("embedding is not representable as JSON: {e}"))
            })?,
        );

        Ok(Value::Object(doc))
    }
}

/// Concatenate name, description, and features into the embedding input.
fn embedding_text(item: &Map<String, Value>) -> String {
    let field = |name: &str| item.get(name).and_then(Value::as_str).unwrap_or_default();
    format!("{} {} {}", field("name"), field("description"), field("features"))
}

/// Parse a catalog price, which arrives as either a string or a number.
fn price_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Read `products.data.items` from the catalog file.
fn load_catalog_items(path: &Path) -> Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        SearchError::Catalog(format!("failed to read {}: {e}", path.display()))
    })?;
    let root: Value = serde_json::from_str(&raw)
        .map_err(|e| SearchError::Catalog(format!("failed to parse catalog: {e}")))?;

    root.pointer("/products/data/items")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| SearchError::Catalog("catalog is missing products.data.items".to_string()))
}
