//! Shared proptest strategies.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Small JSON trees with a bias towards objects and short keys so that
/// generated documents actually share keys.
pub fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(Value::from),
        "[a-c]{0,2}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-e]", inner, 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

/// Arrays of objects carrying identity fields, the shape fixups match on.
pub fn arb_named_list() -> impl Strategy<Value = Value> {
    prop::collection::vec(
        ("[a-f]", prop_oneof![Just("id"), Just("name"), Just("operationId")], arb_json()),
        0..6,
    )
    .prop_map(|items| {
        Value::Array(
            items
                .into_iter()
                .map(|(ident, field, body)| {
                    let mut m = Map::new();
                    m.insert(field.to_string(), Value::String(ident));
                    m.insert("body".to_string(), body);
                    Value::Object(m)
                })
                .collect(),
        )
    })
}
