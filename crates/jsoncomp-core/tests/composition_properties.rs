//! End-to-end composition properties

use jsoncomp_core::prelude::*;
use jsoncomp_core::Unresolved;
use jsoncomp_document::DocumentError;
use jsoncomp_test_utils::{create_counting_generators, ptr, setup_test_session, value, TEST_SEED};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn composer() -> Composer {
    Composer::new(ComposerConfig::new().with_seed(TEST_SEED))
}

fn arb_plain_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-z]{0,6}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_marker_free_documents_are_unchanged(source in arb_plain_json()) {
        let out = composer().compose(value(source.clone())).unwrap();
        prop_assert_eq!(out, value(source));
    }

    #[test]
    fn prop_composition_is_idempotent(x in any::<i64>(), tag in "[a-z]{1,8}") {
        let once = composer()
            .compose(value(json!({
                "$defs": {"x": x},
                "a": {"!ref": "/$defs/x"},
                "g": {"!gen": "Text", "!id": tag}
            })))
            .unwrap();
        let twice = composer().compose(once.clone()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_seeded_composition_is_repeatable(seed in any::<u64>()) {
        let source = value(json!({
            "a": {"!gen": "Uuid"},
            "b": {"!gen": "Integer", "!id": "n"},
            "c": {"!gen": "FirstName", "gender": "female"}
        }));
        let composer = Composer::new(ComposerConfig::new().with_seed(seed));
        prop_assert_eq!(
            composer.compose(source.clone()).unwrap(),
            composer.compose(source).unwrap()
        );
    }

    #[test]
    fn prop_flatten_agrees_with_get(source in arb_plain_json()) {
        let document = Document::from(source);
        for (pointer, expected) in document.flatten() {
            prop_assert_eq!(document.get(&pointer).unwrap(), expected);
        }
    }
}

#[test]
fn defs_reference_resolves_and_defs_vanish() {
    let out = composer()
        .compose(value(json!({"$defs": {"x": 5}, "a": {"!ref": "/$defs/x"}})))
        .unwrap();
    assert_eq!(out, value(json!({"a": 5})));
}

#[test]
fn shared_id_shares_value() {
    let (generators, calls) = create_counting_generators();
    let composer = composer().with_generators(generators);
    let out = composer
        .compose(value(json!({
            "first": {"!gen": "Counter", "!id": "t1"},
            "second": {"!gen": "Counter", "!id": "t1"},
            "other": {"!gen": "Counter"}
        })))
        .unwrap();

    assert_eq!(out.get("first"), out.get("second"));
    assert_ne!(out.get("first"), out.get("other"));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[test]
fn session_shares_ids_across_documents() {
    let composer = composer();
    let mut session = setup_test_session();
    let marker = json!({"user": {"!gen": "Uuid", "!id": "user"}});
    let a = composer
        .compose_with_session(value(marker.clone()), &mut session)
        .unwrap();
    let b = composer
        .compose_with_session(value(marker.clone()), &mut session)
        .unwrap();
    assert_eq!(a, b);

    let mut fresh = GenerationSession::seeded(TEST_SEED + 1);
    let c = composer.compose_with_session(value(marker), &mut fresh).unwrap();
    assert_ne!(a, c);
}

#[test]
fn xref_applies_edits_after_target_resolves() {
    let out = composer()
        .compose(value(json!({
            "admin": {
                "!xref": "/user",
                "extend": {"/role": "admin", "/perms": ["all"]},
                "delete": ["/temp"]
            },
            "user": {"!ref": "/$defs/user"},
            "$defs": {"user": {"name": "Kate", "role": "user", "temp": 1}}
        })))
        .unwrap();
    assert_eq!(
        out,
        value(json!({
            "admin": {"name": "Kate", "role": "admin", "perms": ["all"]},
            "user": {"name": "Kate", "role": "user", "temp": 1}
        }))
    );
}

#[test]
fn xref_condition_met_by_later_pass() {
    let out = composer()
        .compose(value(json!({
            "copy": {"!xref": "/target", "ifPresent": "/late"},
            "target": {"early": 1, "late": {"!ref": "/$defs/late"}},
            "$defs": {"late": 2}
        })))
        .unwrap();
    assert_eq!(out.get("copy"), Some(&value(json!({"early": 1, "late": 2}))));
}

#[test]
fn reference_cycle_does_not_converge() {
    let err = composer()
        .compose(value(json!({"a": {"!ref": "/b"}, "b": {"!ref": "/a"}})))
        .unwrap_err();
    assert!(err.is_non_convergence());
    assert_eq!(
        err.unresolved(),
        &[
            Unresolved {
                pointer: ptr("/a"),
                kind: MarkerKind::Ref,
                reason: "\"/b\" is not resolved yet".into(),
            },
            Unresolved {
                pointer: ptr("/b"),
                kind: MarkerKind::Ref,
                reason: "\"/a\" is not resolved yet".into(),
            },
        ]
    );
}

#[test]
fn missing_target_does_not_converge() {
    let err = composer()
        .compose(value(json!({"a": {"!ref": "/nowhere"}})))
        .unwrap_err();
    assert!(err.is_non_convergence());
    assert!(err.to_string().contains("\"/nowhere\" does not exist yet"));
}

#[test]
fn sequence_index_errors() {
    let mut document = Document::from(json!({"list": [1, 2, 3]}));
    assert!(matches!(
        document.set(&ptr("/list/-1"), value(json!(0))),
        Err(DocumentError::IndexRange { .. })
    ));
    assert!(matches!(
        document.get(&ptr("/list/99")),
        Err(DocumentError::IndexRange { .. } | DocumentError::NotFound { .. })
    ));
}

#[test]
fn markers_inside_sequences() {
    let out = composer()
        .compose(value(json!({
            "$defs": {"n": 1},
            "items": [{"!ref": "/$defs/n"}, 2, [{"!ref": "/items/1"}]]
        })))
        .unwrap();
    assert_eq!(out, value(json!({"items": [1, 2, [2]]})));
}

#[test]
fn marker_at_document_root() {
    let out = composer()
        .compose(value(json!({"!gen": "Integer", "min": 3, "max": 3})))
        .unwrap();
    assert_eq!(out, value(json!(3)));
}

#[test]
fn matchers_survive_as_leaves() {
    let out = composer()
        .compose(value(json!({
            "$defs": {"any_id": {"!match": "AnyNumber"}},
            "user": {"id": {"!ref": "/$defs/any_id"}, "name": "Kate"}
        })))
        .unwrap();
    assert!(out.matches(&value(json!({"user": {"id": 17, "name": "Kate"}}))));
    assert!(out.clone().into_json().is_err());
}

#[test]
fn failed_composition_keeps_document() {
    let source = json!({"a": {"!ref": "/$defs/x"}, "$defs": {"x": 1}, "b": {"!match": "Nope"}});
    let mut document = Document::from(source.clone());
    let mut session = setup_test_session();
    let err = composer()
        .compose_document(&mut document, &mut session)
        .unwrap_err();
    assert!(err.is_unknown());
    assert_eq!(document, Document::from(source));
}

#[test]
fn failed_composition_keeps_session_identities() {
    let composer = composer();
    let mut session = setup_test_session();
    // The generator sits after the bad matcher, so it runs first.
    let err = composer
        .compose_with_session(
            value(json!({
                "bad": {"!match": "Nope"},
                "user": {"!gen": "Uuid", "!id": "user"}
            })),
            &mut session,
        )
        .unwrap_err();
    assert!(err.is_unknown());
    assert_eq!(session.cache_len(), 0);
    assert!(session.cached("Uuid", "user").is_none());

    let retried = composer
        .compose_with_session(value(json!({"user": {"!gen": "Uuid", "!id": "user"}})), &mut session)
        .unwrap();
    let fresh = composer
        .compose_with_session(
            value(json!({"user": {"!gen": "Uuid", "!id": "user"}})),
            &mut setup_test_session(),
        )
        .unwrap();
    assert_eq!(retried, fresh);
}

#[test]
fn report_tracks_passes_and_deferrals() {
    let (_, report) = composer()
        .compose_with_report(value(json!({
            "a": 1,
            "b": {"!ref": "/a"},
            "c": {"!ref": "/b"}
        })))
        .unwrap();
    assert_eq!(report.resolved(MarkerKind::Ref), 2);
    assert_eq!(report.passes, 2);
    assert_eq!(report.deferrals, 1);
}
