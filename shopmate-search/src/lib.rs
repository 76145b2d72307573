//! Hosted search index client, embeddings, and the offline catalog indexer.
//!
//! This crate wraps the two hosted services the assistant depends on:
//!
//! - the embeddings deployment of a hosted OpenAI service
//!   ([`EmbeddingClient`]), and
//! - a hosted search index ([`SearchClient`]) supporting key lookup,
//!   combined keyword + vector search, and pure vector similarity queries.
//!
//! [`Indexer`] is the offline/batch path: it reads a local product catalog,
//! embeds every item, derives the index schema from the first document
//! ([`schema::infer_index_definition`]), creates the index if absent, and
//! bulk-upserts all documents.
//!
//! All operations return typed [`SearchError`] values; this layer never
//! swallows failures into fallback text. Converting errors to user-safe
//! replies is the presentation layer's job.

pub mod client;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod schema;

pub use client::{SEARCH_API_VERSION, SearchClient};
pub use embedding::{Embedder, EmbeddingClient, INDEXER_API_VERSION, QUERY_API_VERSION};
pub use error::{Result, SearchError};
pub use indexer::{IndexReport, Indexer};
pub use schema::{IndexDefinition, IndexField, infer_index_definition};
