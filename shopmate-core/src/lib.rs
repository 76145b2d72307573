//! Shared types and configuration for the shopmate shopping assistant.
//!
//! This crate holds the data shapes exchanged between the search, model,
//! and server crates, plus the environment-derived [`Settings`] value that
//! is constructed once at startup and passed to each client explicitly.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ChannelSettings, OpenAiSettings, SearchSettings, Settings};
pub use error::ConfigError;
pub use types::{BotContext, Product, SearchOptions, UserContext, UserInteraction};
