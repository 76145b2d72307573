//! Data shapes for products, search options, and user context.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product record as stored in the hosted search index.
///
/// The `id` field is the product's identity and is used as an opaque key
/// into the hosted store; no other validation or normalization is applied.
/// Products are created by the offline indexer and read-only at request time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier; the search index document key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Price in the catalog currency.
    #[serde(default)]
    pub price: f64,
    /// Product category.
    #[serde(default)]
    pub category: String,
    /// Optional product image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Optional brand name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Optional rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Embedding vector, present when the full document is fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    /// Optional features text used for embedding and keyword search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    /// Optional keywords text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    /// Optional product page URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Transient per-call query parameters for product search.
///
/// Constructed per call and never persisted. `Default` is all-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchOptions {
    /// Number of nearest neighbors for the vector component of the query.
    pub k: Option<usize>,
    /// OData filter expression.
    pub filter: Option<String>,
    /// Fields to select in results.
    pub select: Option<Vec<String>>,
    /// Ordering expressions.
    pub order_by: Option<Vec<String>>,
    /// Maximum number of results.
    pub top: Option<usize>,
}

impl SearchOptions {
    /// Options limited to the top `n` results.
    pub fn top(n: usize) -> Self {
        Self { top: Some(n), ..Self::default() }
    }
}

/// A single recorded user/product interaction.
///
/// Declared for future user-history tracking; no runtime code path consumes
/// it yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserInteraction {
    /// Unique identifier for the interaction.
    pub id: String,
    /// The user who interacted.
    pub user_id: String,
    /// The product interacted with.
    pub product_id: String,
    /// Kind of interaction (view, click, purchase, ...).
    pub interaction_type: String,
    /// When the interaction happened.
    pub timestamp: DateTime<Utc>,
}

/// Aggregated per-user browsing context.
///
/// Declared for future personalization; unused at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    /// Products the user recently looked at.
    pub recent_products: Vec<Product>,
    /// Kinds of interactions observed.
    pub interaction_types: Vec<String>,
}

/// Per-user bot conversation context.
///
/// Declared for future personalization; unused at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BotContext {
    /// The user this context belongs to.
    pub user_id: String,
    /// Recent message texts, newest last.
    pub recent_messages: Vec<String>,
    /// Free-form user preferences.
    pub user_preferences: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: "GGOEWXXX0828".to_string(),
            name: "Camp Mug".to_string(),
            description: "Enamel camp mug".to_string(),
            price: 12.5,
            category: "Drinkware".to_string(),
            image_url: None,
            brand: Some("Shopmate".to_string()),
            rating: None,
            vector: None,
            features: Some("dishwasher safe".to_string()),
            keywords: None,
            url: None,
        }
    }

    #[test]
    fn product_serializes_camel_case_and_skips_absent_options() {
        let json = serde_json::to_value(sample_product()).unwrap();
        assert_eq!(json["id"], "GGOEWXXX0828");
        assert_eq!(json["brand"], "Shopmate");
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("imageUrl"));
        assert!(!obj.contains_key("vector"));
    }

    #[test]
    fn product_deserializes_search_result_with_partial_fields() {
        // Search results carry only the selected fields plus service metadata.
        let json = serde_json::json!({
            "@search.score": 1.2,
            "id": "p1",
            "name": "Mug",
            "description": "A mug",
            "price": 9.99,
            "category": "Drinkware",
            "url": "https://example.com/p1"
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.id, "p1");
        assert_eq!(product.price, 9.99);
        assert!(product.vector.is_none());
    }

    #[test]
    fn user_context_shapes_round_trip() {
        let interaction = UserInteraction {
            id: "i1".to_string(),
            user_id: "u1".to_string(),
            product_id: "p1".to_string(),
            interaction_type: "view".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&interaction).unwrap();
        assert_eq!(json["userId"], "u1");
        let back: UserInteraction = serde_json::from_value(json).unwrap();
        assert_eq!(back, interaction);

        let context = BotContext { user_id: "u1".to_string(), ..BotContext::default() };
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["recentMessages"], serde_json::json!([]));
    }
}
