//! Index schema inference from a sample document.
//!
//! The hosted index's structural definition is derived once, at bootstrap,
//! from the field shapes of the first augmented catalog document: the vector
//! field carries the embedding dimensionality, `id` becomes the document
//! key, numeric fields become filterable/sortable doubles, and everything
//! else defaults to a searchable string field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the embedding vector field in index documents.
pub const VECTOR_FIELD: &str = "vector";

/// Name of the vector search profile referenced by the vector field.
const VECTOR_PROFILE: &str = "default";

/// Name of the HNSW algorithm configuration.
const VECTOR_ALGORITHM: &str = "default-hnsw";

/// A single field in the index definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexField {
    /// Field name.
    pub name: String,
    /// EDM type, e.g. `Edm.String` or `Collection(Edm.Single)`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Marks the document key field. Emitted only for the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<bool>,
    /// Whether the field participates in full-text (or vector) search.
    pub searchable: bool,
    /// Whether the field can appear in filter expressions.
    pub filterable: bool,
    /// Whether the field can be used for ordering.
    pub sortable: bool,
    /// Whether the field can be faceted.
    pub facetable: bool,
    /// Embedding dimensionality; vector fields only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    /// Vector search profile reference; vector fields only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_search_profile: Option<String>,
}

impl IndexField {
    fn vector(name: &str, dimensions: usize) -> Self {
        Self {
            name: name.to_string(),
            field_type: "Collection(Edm.Single)".to_string(),
            key: None,
            searchable: true,
            filterable: false,
            sortable: false,
            facetable: false,
            dimensions: Some(dimensions),
            vector_search_profile: Some(VECTOR_PROFILE.to_string()),
        }
    }

    fn document_key(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: "Edm.String".to_string(),
            key: Some(true),
            searchable: false,
            filterable: true,
            sortable: true,
            facetable: false,
            dimensions: None,
            vector_search_profile: None,
        }
    }

    fn double(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: "Edm.Double".to_string(),
            key: None,
            searchable: false,
            filterable: true,
            sortable: true,
            facetable: false,
            dimensions: None,
            vector_search_profile: None,
        }
    }

    fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: "Edm.String".to_string(),
            key: None,
            searchable: true,
            filterable: true,
            sortable: false,
            facetable: false,
            dimensions: None,
            vector_search_profile: None,
        }
    }
}

/// Vector search profile entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorProfile {
    /// Profile name.
    pub name: String,
    /// Referenced algorithm configuration name.
    pub algorithm: String,
}

/// HNSW algorithm parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HnswParameters {
    /// Distance metric.
    pub metric: String,
    /// Number of bidirectional links per node.
    pub m: u32,
    /// Size of the dynamic candidate list during construction.
    pub ef_construction: u32,
}

/// Vector search algorithm configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VectorAlgorithm {
    /// Configuration name.
    pub name: String,
    /// Algorithm kind.
    pub kind: String,
    /// HNSW tuning parameters.
    pub hnsw_parameters: HnswParameters,
}

/// The `vectorSearch` section of the index definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorSearch {
    /// Named profiles referencing algorithm configurations.
    pub profiles: Vec<VectorProfile>,
    /// Algorithm configurations.
    pub algorithms: Vec<VectorAlgorithm>,
}

impl Default for VectorSearch {
    fn default() -> Self {
        Self {
            profiles: vec![VectorProfile {
                name: VECTOR_PROFILE.to_string(),
                algorithm: VECTOR_ALGORITHM.to_string(),
            }],
            algorithms: vec![VectorAlgorithm {
                name: VECTOR_ALGORITHM.to_string(),
                kind: "hnsw".to_string(),
                hnsw_parameters: HnswParameters {
                    metric: "cosine".to_string(),
                    m: 4,
                    ef_construction: 400,
                },
            }],
        }
    }
}

/// A complete index structural definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    /// Index name.
    pub name: String,
    /// Field definitions.
    pub fields: Vec<IndexField>,
    /// Vector search configuration.
    pub vector_search: VectorSearch,
}

impl IndexDefinition {
    /// The field marked as document key, if any.
    pub fn key_field(&self) -> Option<&IndexField> {
        self.fields.iter().find(|f| f.key == Some(true))
    }

    /// The vector field, if any.
    pub fn vector_field(&self) -> Option<&IndexField> {
        self.fields.iter().find(|f| f.name == VECTOR_FIELD)
    }
}

/// Derive an [`IndexDefinition`] from the field shapes of a sample document.
///
/// Field rules, in order of precedence per field:
///
/// 1. a field named [`VECTOR_FIELD`] holding an array becomes the vector
///    field, dimensioned by the array length;
/// 2. a field named `id` becomes the document key;
/// 3. JSON numbers become filterable/sortable `Edm.Double` fields;
/// 4. everything else becomes a searchable `Edm.String` field.
pub fn infer_index_definition(index_name: &str, sample: &Map<String, Value>) -> IndexDefinition {
    let fields = sample
        .iter()
        .map(|(name, value)| match (name.as_str(), value) {
            (VECTOR_FIELD, Value::Array(items)) => IndexField::vector(name, items.len()),
            ("id", _) => IndexField::document_key(name),
            (_, Value::Number(_)) => IndexField::double(name),
            _ => IndexField::string(name),
        })
        .collect();

    IndexDefinition {
        name: index_name.to_string(),
        fields,
        vector_search: VectorSearch::default(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Map<String, Value> {
        json!({
            "id": "p1",
            "name": "Camp Mug",
            "description": "Enamel camp mug",
            "price": 12.5,
            "vector": [0.1, 0.2, 0.3],
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn id_field_is_the_document_key() {
        let definition = infer_index_definition("products", &sample());
        let key = definition.key_field().expect("key field");
        assert_eq!(key.name, "id");
        assert_eq!(key.field_type, "Edm.String");
        assert!(!key.searchable);
        assert!(key.filterable && key.sortable);
    }

    #[test]
    fn vector_field_carries_embedding_dimensions() {
        let definition = infer_index_definition("products", &sample());
        let vector = definition.vector_field().expect("vector field");
        assert_eq!(vector.field_type, "Collection(Edm.Single)");
        assert_eq!(vector.dimensions, Some(3));
        assert_eq!(vector.vector_search_profile.as_deref(), Some(VECTOR_PROFILE));
        assert!(vector.searchable);
        assert!(!vector.filterable && !vector.sortable);
    }

    #[test]
    fn numbers_are_filterable_sortable_doubles() {
        let definition = infer_index_definition("products", &sample());
        let price = definition.fields.iter().find(|f| f.name == "price").unwrap();
        assert_eq!(price.field_type, "Edm.Double");
        assert!(!price.searchable);
        assert!(price.filterable && price.sortable);
    }

    #[test]
    fn other_fields_default_to_searchable_strings() {
        let definition = infer_index_definition("products", &sample());
        let name = definition.fields.iter().find(|f| f.name == "name").unwrap();
        assert_eq!(name.field_type, "Edm.String");
        assert!(name.searchable && name.filterable);
        assert!(!name.sortable);
        assert!(name.key.is_none());
    }

    #[test]
    fn definition_serializes_hnsw_configuration() {
        let definition = infer_index_definition("products", &sample());
        let json = serde_json::to_value(&definition).unwrap();
        assert_eq!(json["name"], "products");
        assert_eq!(json["vectorSearch"]["algorithms"][0]["kind"], "hnsw");
        assert_eq!(json["vectorSearch"]["algorithms"][0]["hnswParameters"]["m"], 4);
        assert_eq!(
            json["vectorSearch"]["algorithms"][0]["hnswParameters"]["efConstruction"],
            400
        );
        assert_eq!(json["vectorSearch"]["profiles"][0]["name"], "default");
        // key is emitted only on the key field
        let fields = json["fields"].as_array().unwrap();
        for field in fields {
            let is_id = field["name"] == "id";
            assert_eq!(field.get("key").is_some(), is_id);
        }
    }
}
