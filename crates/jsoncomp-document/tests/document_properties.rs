use jsoncomp_document::{Document, DocumentError, Pointer, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(serde_json::Value::Array),
            prop::collection::vec(("[a-z~/]{1,4}", inner), 0..5).prop_map(|entries| {
                serde_json::Value::Object(entries.into_iter().collect())
            }),
        ]
    })
}

#[test]
fn test_list_index_errors() {
    let mut doc = Document::from(json!({"list": [1, 2, 3]}));
    let list = Pointer::root().child("list");

    assert!(matches!(
        doc.set(&list.child(-1), Value::from("v")),
        Err(DocumentError::IndexRange { .. })
    ));
    assert!(matches!(
        doc.get(&list.child(99)),
        Err(DocumentError::IndexRange { .. })
    ));
    assert_eq!(doc.get(&list).unwrap(), Value::from(json!([1, 2, 3])));
}

#[test]
fn test_marker_free_document_unchanged_by_flatten() {
    let source = json!({"a": {"b": [true, null, "s"]}, "c": 1.5});
    let doc = Document::from(source.clone());
    let (root_ptr, root_value) = doc.flatten().into_iter().next().unwrap();
    assert!(root_ptr.is_root());
    assert_eq!(root_value.into_json().unwrap(), source);
}

proptest! {
    #[test]
    fn prop_flatten_pairs_resolve(source in arb_json()) {
        let doc = Document::from(source);
        for (ptr, value) in doc.flatten() {
            prop_assert_eq!(doc.get(&ptr).unwrap(), value);
        }
    }

    #[test]
    fn prop_pointer_text_round_trips(source in arb_json()) {
        let doc = Document::from(source);
        for (ptr, _) in doc.walk() {
            let reparsed = Pointer::parse(&ptr.to_string()).unwrap();
            prop_assert_eq!(&reparsed, &ptr);
            prop_assert!(doc.contains(&reparsed));
        }
    }

    #[test]
    fn prop_delete_shifts_sequence(items in prop::collection::vec(any::<i32>(), 1..8), pick in any::<prop::sample::Index>()) {
        let index = pick.index(items.len());
        let mut doc = Document::from(json!({ "list": items.clone() }));
        let removed = doc.delete(&Pointer::root().child("list").child(index)).unwrap();
        prop_assert_eq!(removed, Value::from(items[index]));

        let mut expected = items.clone();
        expected.remove(index);
        prop_assert_eq!(doc.get(&Pointer::root().child("list")).unwrap(), Value::from(json!(expected)));
    }

    #[test]
    fn prop_replace_keeps_node_count_consistent(source in arb_json(), replacement in arb_json()) {
        let mut doc = Document::from(json!({ "slot": source }));
        let id = doc.node_id(&Pointer::root().child("slot")).unwrap();
        doc.replace(id, Value::from(replacement.clone())).unwrap();

        let fresh = Document::from(json!({ "slot": replacement }));
        prop_assert_eq!(doc.len(), fresh.len());
        prop_assert_eq!(doc.to_value(), fresh.to_value());
    }
}
