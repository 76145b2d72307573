//! Error types for the `shopmate-model` crate.

use thiserror::Error;

/// Errors that can occur while requesting a chat completion.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The client was constructed with incomplete configuration.
    #[error("Chat configuration error: {0}")]
    Config(String),

    /// The completion request could not be sent.
    #[error("Chat request failed ({deployment}): {message}")]
    Request {
        /// The chat deployment the request targeted.
        deployment: String,
        /// A description of the failure.
        message: String,
    },

    /// The service answered with a non-success status.
    #[error("Chat API returned {status} ({deployment}): {message}")]
    Upstream {
        /// The chat deployment the request targeted.
        deployment: String,
        /// The HTTP status returned.
        status: u16,
        /// The response body, as far as it could be read.
        message: String,
    },

    /// The response could not be parsed or carried no choices.
    #[error("Malformed chat response ({deployment}): {message}")]
    MalformedResponse {
        /// The chat deployment the request targeted.
        deployment: String,
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for chat operations.
pub type Result<T> = std::result::Result<T, ModelError>;
