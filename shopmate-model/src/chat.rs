//! Chat-completion client for a hosted OpenAI deployment.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use shopmate_core::config::OpenAiSettings;
use shopmate_core::types::Product;

use crate::error::{ModelError, Result};

/// API version for chat completion requests.
pub const CHAT_API_VERSION: &str = "2023-07-01-preview";

/// Fixed apology returned by [`ChatClient::ask`] when a completion fails.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't get a response about the product.";

/// System instruction constraining the assistant to the supplied product.
const SYSTEM_PROMPT: &str =
    "You are a helpful shopping assistant. Answer based only on the product info provided.";

const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.7;

/// Connection settings for one chat deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Service endpoint, e.g. `https://my-openai.openai.azure.com`.
    pub endpoint: String,
    /// API key sent in the `api-key` header.
    pub api_key: String,
    /// Chat deployment name.
    pub deployment: String,
}

impl From<&OpenAiSettings> for ChatConfig {
    fn from(settings: &OpenAiSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            deployment: settings.deployment.clone(),
        }
    }
}

/// A client for one hosted chat-completion deployment.
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

// ── Chat API request/response types ────────────────────────────────

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl ChatClient {
    /// Create a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if the endpoint, key, or deployment
    /// is blank.
    pub fn new(config: ChatConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty()
            || config.api_key.trim().is_empty()
            || config.deployment.trim().is_empty()
        {
            return Err(ModelError::Config(
                "endpoint, api key, and deployment name are all required".to_string(),
            ));
        }
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        Ok(Self { client: reqwest::Client::new(), config: ChatConfig { endpoint, ..config } })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint, self.config.deployment, CHAT_API_VERSION
        )
    }

    /// Request a completion for `query` grounded in `product`.
    ///
    /// The prompt is a fixed triple: the system shopping-assistant
    /// instruction, the pretty-printed product JSON, and the literal user
    /// query.
    ///
    /// # Errors
    ///
    /// Returns a typed [`ModelError`] for transport failures, non-success
    /// statuses, and responses without a first choice.
    pub async fn complete(&self, query: &str, product: &Product) -> Result<String> {
        let deployment = &self.config.deployment;
        let product_json = serde_json::to_string_pretty(product).map_err(|e| {
            ModelError::Request {
                deployment: deployment.clone(),
                message: format!("failed to serialize product: {e}"),
            }
        })?;
        let product_context = format!("Product Info:\n{product_json}");

        let request = ChatRequest {
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &product_context },
                ChatMessage { role: "user", content: query },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        debug!(deployment = %deployment, product_id = %product.id, "requesting completion");

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(deployment = %deployment, error = %e, "completion request failed");
                ModelError::Request {
                    deployment: deployment.clone(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(deployment = %deployment, %status, "completion API error");
            return Err(ModelError::Upstream {
                deployment: deployment.clone(),
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(deployment = %deployment, error = %e, "failed to parse completion response");
            ModelError::MalformedResponse {
                deployment: deployment.clone(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        parsed.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            ModelError::MalformedResponse {
                deployment: deployment.clone(),
                message: "response carried no choices".to_string(),
            }
        })
    }

    /// Answer `query` about `product`, falling back to a fixed apology.
    ///
    /// This is the one deliberate swallow-point in the system: any
    /// completion failure (or an empty model answer) is logged and replaced
    /// by [`FALLBACK_ANSWER`]. The returned text is never empty.
    pub async fn ask(&self, query: &str, product: &Product) -> String {
        match self.complete(query, product).await {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                warn!(product_id = %product.id, "model returned an empty answer");
                FALLBACK_ANSWER.to_string()
            }
            Err(e) => {
                error!(product_id = %product.id, error = %e, "completion failed");
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}
