//! The product dialog: one turn of the shopping conversation.
//!
//! Stateless across turns except for the conversation record persisted
//! after every turn. Errors from lookup or completion never escape this
//! layer; they become the fixed lookup-error reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use shopmate_core::types::Product;
use shopmate_model::ChatClient;
use shopmate_search::{SearchClient, SearchError};

use crate::activity::Activity;
use crate::adapter::TurnHandler;
use crate::state::ConversationState;

/// Product id assumed when the channel payload carries none.
pub const FALLBACK_PRODUCT_ID: &str = "GGOEWXXX0828";

/// Reply sent when product lookup or answering fails.
pub const LOOKUP_ERROR_TEXT: &str = "Sorry, I couldn't fetch product details.";

/// Source of product records, keyed by id.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch a product by its id.
    async fn product_by_id(&self, id: &str) -> Result<Product, SearchError>;
}

#[async_trait]
impl ProductSource for SearchClient {
    async fn product_by_id(&self, id: &str) -> Result<Product, SearchError> {
        SearchClient::product_by_id(self, id).await
    }
}

/// Produces a user-safe answer about a product. Implementations never fail;
/// they fall back to safe text internally.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Answer `query` about `product`.
    async fn answer(&self, query: &str, product: &Product) -> String;
}

#[async_trait]
impl Assistant for ChatClient {
    async fn answer(&self, query: &str, product: &Product) -> String {
        self.ask(query, product).await
    }
}

/// The conversation handler for product questions.
pub struct ProductDialog {
    products: Arc<dyn ProductSource>,
    assistant: Arc<dyn Assistant>,
    conversation_state: ConversationState,
}

impl ProductDialog {
    /// Create a dialog over the given product source and assistant.
    pub fn new(
        products: Arc<dyn ProductSource>,
        assistant: Arc<dyn Assistant>,
        conversation_state: ConversationState,
    ) -> Self {
        Self { products, assistant, conversation_state }
    }

    /// Run one turn: handle the activity, persist conversation state, and
    /// return the replies to deliver.
    ///
    /// State is saved whether or not the turn produced a reply or an
    /// internal failure.
    pub async fn run(&self, activity: &Activity) -> Vec<Activity> {
        let replies = if activity.is_message() {
            let text = self.handle_message(activity).await;
            vec![activity.reply(text)]
        } else {
            Vec::new()
        };

        let conversation_id = activity.conversation_id();
        let mut record = self.conversation_state.load(conversation_id).await;
        record.turn_count += 1;
        record.last_activity_id = activity.id.clone();
        self.conversation_state.save(conversation_id, record).await;

        replies
    }

    /// Resolve the product, ask the assistant, and produce the reply text.
    /// Never fails; lookup errors become [`LOOKUP_ERROR_TEXT`].
    async fn handle_message(&self, activity: &Activity) -> String {
        let product_id = activity.channel_data_str("productId").unwrap_or(FALLBACK_PRODUCT_ID);
        let query = activity.text.as_deref().unwrap_or_default();

        match self.products.product_by_id(product_id).await {
            Ok(product) => self.assistant.answer(query, &product).await,
            Err(e) => {
                error!(product_id, error = %e, "failed to fetch product for turn");
                LOOKUP_ERROR_TEXT.to_string()
            }
        }
    }
}

#[async_trait]
impl TurnHandler for ProductDialog {
    async fn on_turn(&self, activity: &Activity) -> anyhow::Result<Vec<Activity>> {
        Ok(self.run(activity).await)
    }
}
