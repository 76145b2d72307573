//! Property tests for index schema inference.

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use shopmate_search::infer_index_definition;

/// Generate an arbitrary non-special field value (string, number, or bool).
fn arb_field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(Value::String),
        (-1.0e6f64..1.0e6f64).prop_map(|n| json!(n)),
        any::<bool>().prop_map(Value::Bool),
    ]
}

/// Generate a sample document: an `id`, a `vector` of the given length, and
/// a handful of arbitrary extra fields.
fn arb_sample_doc(dims: usize) -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::hash_map("[a-z]{3,8}", arb_field_value(), 0..8).prop_map(move |extra| {
        let mut doc = Map::new();
        doc.insert("id".to_string(), Value::String("p1".to_string()));
        doc.insert("vector".to_string(), json!(vec![0.5f32; dims]));
        for (name, value) in extra {
            // extras never shadow the special fields
            if name != "id" && name != "vector" {
                doc.insert(name, value);
            }
        }
        doc
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any sample document, the inferred definition has one field per
    /// document field, exactly one key (the `id` field), a vector field
    /// dimensioned by the sample's vector length, and type mappings that
    /// follow the field rules.
    #[test]
    fn inferred_definition_follows_field_rules(
        doc in (1usize..64).prop_flat_map(arb_sample_doc),
    ) {
        let dims = doc["vector"].as_array().unwrap().len();
        let definition = infer_index_definition("products", &doc);

        prop_assert_eq!(definition.fields.len(), doc.len());

        let keys: Vec<_> = definition.fields.iter().filter(|f| f.key == Some(true)).collect();
        prop_assert_eq!(keys.len(), 1);
        prop_assert_eq!(keys[0].name.as_str(), "id");

        let vector = definition.vector_field().expect("vector field present");
        prop_assert_eq!(vector.dimensions, Some(dims));
        prop_assert_eq!(vector.field_type.as_str(), "Collection(Edm.Single)");

        for field in &definition.fields {
            if field.name == "id" || field.name == "vector" {
                continue;
            }
            match &doc[field.name.as_str()] {
                Value::Number(_) => {
                    prop_assert_eq!(field.field_type.as_str(), "Edm.Double");
                    prop_assert!(field.filterable && field.sortable && !field.searchable);
                }
                _ => {
                    prop_assert_eq!(field.field_type.as_str(), "Edm.String");
                    prop_assert!(field.searchable && field.filterable && !field.sortable);
                }
            }
        }
    }
}
