//! Channel activity wire types.
//!
//! The channel protocol is an external contract; these types model only the
//! fields this service reads and writes. Unknown fields are ignored on the
//! way in and omitted on the way out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Activity type for user/bot messages.
pub const MESSAGE_TYPE: &str = "message";

/// A conversation reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    /// Channel-assigned conversation id.
    pub id: String,
}

/// A user or bot account on the channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    /// Channel-assigned account id.
    pub id: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One activity of the channel conversation protocol.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    /// Activity kind; this service only acts on [`MESSAGE_TYPE`].
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Channel-assigned activity id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Message text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Originating channel id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// The conversation this activity belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    /// Sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    /// Receiver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    /// Connector base URL for delivering replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    /// Id of the activity this one replies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    /// Channel-specific payload (e.g. the product id for this storefront).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<Value>,
    /// When the activity was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Activity {
    /// A bare message activity. Handy in tests.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            activity_type: MESSAGE_TYPE.to_string(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Whether this is a message activity.
    pub fn is_message(&self) -> bool {
        self.activity_type == MESSAGE_TYPE
    }

    /// A string value out of `channelData`, if present.
    pub fn channel_data_str(&self, key: &str) -> Option<&str> {
        self.channel_data.as_ref()?.get(key)?.as_str()
    }

    /// The conversation id, or `"anonymous"` when the channel sent none.
    pub fn conversation_id(&self) -> &str {
        self.conversation.as_ref().map(|c| c.id.as_str()).unwrap_or("anonymous")
    }

    /// Build a reply to this activity carrying `text`.
    ///
    /// From/recipient are swapped, the conversation and service URL are
    /// carried over, and `replyToId` points at this activity.
    pub fn reply(&self, text: impl Into<String>) -> Activity {
        Activity {
            activity_type: MESSAGE_TYPE.to_string(),
            id: Some(Uuid::new_v4().to_string()),
            text: Some(text.into()),
            channel_id: self.channel_id.clone(),
            conversation: self.conversation.clone(),
            from: self.recipient.clone(),
            recipient: self.from.clone(),
            service_url: self.service_url.clone(),
            reply_to_id: self.id.clone(),
            channel_data: None,
            timestamp: Some(Utc::now()),
        }
    }
}
