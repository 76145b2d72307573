//! Channel adapter: turn processing and reply delivery.
//!
//! The adapter owns the outward-facing half of a turn: it invokes the turn
//! handler, converts handler failures into the generic turn-error reply,
//! and delivers reply activities to the channel connector. Delivery
//! failures are logged and never propagated, so the webhook call always
//! completes.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use shopmate_core::config::ChannelSettings;

use crate::activity::Activity;

/// Reply text substituted when the turn handler itself fails.
pub const TURN_ERROR_TEXT: &str = "The bot encountered an error or bug.";

/// Token endpoint for channel client-credential auth.
const LOGIN_URL: &str = "https://login.microsoftonline.com/botframework.com/oauth2/v2.0/token";

/// OAuth scope for the channel connector.
const TOKEN_SCOPE: &str = "https://api.botframework.com/.default";

/// Errors raised while authenticating with or delivering to the channel.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Token acquisition failed.
    #[error("channel token request failed: {0}")]
    Token(String),

    /// Reply delivery to the connector failed.
    #[error("reply delivery failed: {0}")]
    Delivery(String),
}

/// Channel app credentials. Blank credentials mean auth is disabled and
/// replies are delivered unauthenticated.
#[derive(Debug, Clone, Default)]
pub struct ChannelCredentials {
    app_id: String,
    app_password: String,
}

impl ChannelCredentials {
    /// Credentials from channel settings (already blanked when auth is
    /// disabled).
    pub fn from_settings(settings: &ChannelSettings) -> Self {
        Self { app_id: settings.app_id.clone(), app_password: settings.app_password.clone() }
    }

    /// Whether delivery should skip authentication.
    pub fn is_anonymous(&self) -> bool {
        self.app_id.is_empty()
    }
}

/// A handler invoked once per inbound activity.
#[async_trait]
pub trait TurnHandler: Send + Sync {
    /// Process one turn, returning the reply activities to deliver.
    async fn on_turn(&self, activity: &Activity) -> anyhow::Result<Vec<Activity>>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The channel adapter.
pub struct ChannelAdapter {
    client: reqwest::Client,
    credentials: ChannelCredentials,
}

impl ChannelAdapter {
    /// Create an adapter with the given credentials.
    pub fn new(credentials: ChannelCredentials) -> Self {
        Self { client: reqwest::Client::new(), credentials }
    }

    /// Process one inbound activity end to end.
    ///
    /// Handler failures become the generic turn-error reply; delivery
    /// failures are logged and swallowed. This method never fails; a turn
    /// always completes.
    pub async fn process(&self, activity: Activity, handler: &dyn TurnHandler) {
        let replies = match handler.on_turn(&activity).await {
            Ok(replies) => replies,
            Err(e) => {
                error!(error = %e, "turn handler failed");
                vec![activity.reply(TURN_ERROR_TEXT)]
            }
        };

        for reply in replies {
            if let Err(e) = self.send_activity(&reply).await {
                error!(error = %e, "failed to deliver reply");
            }
        }
    }

    /// Deliver one reply activity to the channel connector.
    ///
    /// Activities without a service URL (e.g. in tests or direct calls) are
    /// skipped silently.
    async fn send_activity(&self, reply: &Activity) -> Result<(), AdapterError> {
        let Some(service_url) = reply.service_url.as_deref() else {
            debug!("no service url on activity, skipping delivery");
            return Ok(());
        };
        let Some(conversation) = reply.conversation.as_ref() else {
            debug!("no conversation on activity, skipping delivery");
            return Ok(());
        };

        let mut url = format!(
            "{}/v3/conversations/{}/activities",
            service_url.trim_end_matches('/'),
            conversation.id
        );
        if let Some(reply_to) = reply.reply_to_id.as_deref() {
            url.push('/');
            url.push_str(reply_to);
        }

        let mut request = self.client.post(&url).json(reply);
        if !self.credentials.is_anonymous() {
            request = request.bearer_auth(self.token().await?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AdapterError::Delivery(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Delivery(format!("connector returned {status}: {body}")));
        }

        debug!(conversation = %conversation.id, "delivered reply");
        Ok(())
    }

    /// Acquire a connector token via client credentials.
    async fn token(&self) -> Result<String, AdapterError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.app_id.as_str()),
            ("client_secret", self.credentials.app_password.as_str()),
            ("scope", TOKEN_SCOPE),
        ];

        let response = self
            .client
            .post(LOGIN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| AdapterError::Token(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AdapterError::Token(format!("login endpoint returned {status}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Token(format!("failed to parse token response: {e}")))?;

        Ok(token.access_token)
    }
}
