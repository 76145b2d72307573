//! Error types for the `shopmate-search` crate.

use thiserror::Error;

/// Errors that can occur while talking to the hosted search and embedding
/// services or while running the offline indexer.
#[derive(Debug, Error)]
pub enum SearchError {
    /// An embedding request failed.
    #[error("Embedding error ({deployment}): {message}")]
    Embedding {
        /// The embedding deployment the request targeted.
        deployment: String,
        /// A description of the failure.
        message: String,
    },

    /// A search index management or query request failed.
    #[error("Search index error ({operation}): {message}")]
    Index {
        /// The operation that failed (lookup, search, create, upsert, ...).
        operation: String,
        /// A description of the failure.
        message: String,
    },

    /// No document with the given key exists in the index.
    #[error("Product not found: {id}")]
    NotFound {
        /// The requested document key.
        id: String,
    },

    /// A product lacks the stored vector required for similarity search.
    #[error("Product {id} does not contain a vector for similarity search")]
    MissingVector {
        /// The product id.
        id: String,
    },

    /// The local catalog could not be read or parsed.
    #[error("Catalog error: {0}")]
    Catalog(String),
}

/// A convenience result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
