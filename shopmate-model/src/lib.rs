//! Hosted chat-completion client for the shopping assistant.
//!
//! [`ChatClient::complete`] posts a fixed three-message prompt (assistant
//! role instructions, serialized product JSON, the user query) to a hosted
//! chat deployment and returns the first choice's text as a typed result.
//! [`ChatClient::ask`] is the user-safe boundary on top of it: any failure
//! is logged and converted into a fixed apology string, so callers always
//! receive non-empty text.

mod chat;
mod error;

pub use chat::{CHAT_API_VERSION, ChatClient, ChatConfig, FALLBACK_ANSWER};
pub use error::{ModelError, Result};
