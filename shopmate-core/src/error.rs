//! Error types for the `shopmate-core` crate.

use thiserror::Error;

/// Errors raised while assembling configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("missing required environment variable {name}")]
    MissingVar {
        /// The name of the missing variable.
        name: String,
    },

    /// An environment variable is present but cannot be parsed.
    #[error("invalid value for {name}: {message}")]
    InvalidValue {
        /// The name of the offending variable.
        name: String,
        /// A description of the parse failure.
        message: String,
    },
}
