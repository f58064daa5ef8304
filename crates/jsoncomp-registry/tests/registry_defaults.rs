//! Built-in registries: names, argument binding and determinism

use jsoncomp_document::{Matcher, Value};
use jsoncomp_registry::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

const MATCHER_NAMES: &[&str] = &[
    "Anything",
    "AnyBool",
    "AnyDict",
    "AnyNonEmptyDict",
    "AnyText",
    "AnyTextLike",
    "AnyTextWith",
    "AnyNumber",
    "AnyNumberGreaterThan",
    "AnyNumberLessThan",
    "AnyNumberInRange",
    "AnyList",
    "AnyListOf",
    "AnyListLongerThan",
    "AnyListShorterThan",
    "AnyListOfRange",
    "AnyListOfMatchers",
    "AnyListOfMatchersLongerThan",
    "AnyListOfMatchersShorterThan",
    "AnyDate",
    "AnyDateBefore",
    "AnyDateAfter",
    "AnyDateInRange",
];

#[test]
fn default_generators_registered() {
    let registry = GeneratorRegistry::with_defaults();
    assert_eq!(
        registry.names(),
        vec!["FirstName", "LastName", "Integer", "Float", "Choice", "Text", "Uuid"]
    );
}

#[test]
fn default_matchers_registered() {
    let registry = MatcherRegistry::with_defaults();
    let mut names = registry.names();
    names.sort_unstable();
    let mut expected = MATCHER_NAMES.to_vec();
    expected.sort_unstable();
    assert_eq!(names, expected);
}

#[test]
fn unknown_names_are_reported() {
    let matchers = MatcherRegistry::with_defaults();
    let err = matchers
        .build("AnyUnicorn", &Arguments::new("AnyUnicorn"))
        .unwrap_err();
    assert!(err.is_unknown());
    assert_eq!(err.to_string(), "failed to find matcher with name \"AnyUnicorn\"");

    let generators = GeneratorRegistry::with_defaults();
    let mut session = GenerationSession::seeded(0);
    let err = generators
        .generate("Unicorn", &Arguments::new("Unicorn"), None, &mut session)
        .unwrap_err();
    assert!(err.is_unknown());
}

#[test]
fn positional_and_keyword_arguments_mix() {
    let generators = GeneratorRegistry::with_defaults();
    let mut session = GenerationSession::seeded(5);
    let args = Arguments::new("Integer")
        .with_positional(vec![Value::from(7)])
        .with_arg("max", 7);
    assert_eq!(
        generators.generate("Integer", &args, None, &mut session).unwrap(),
        Value::from(7)
    );
}

#[test]
fn unexpected_argument_is_rejected() {
    let generators = GeneratorRegistry::with_defaults();
    let mut session = GenerationSession::seeded(5);
    let args = Arguments::new("LastName").with_arg("gender", "female");
    let err = generators
        .generate("LastName", &args, None, &mut session)
        .unwrap_err();
    assert!(err.is_argument_error());
}

#[test]
fn list_of_matchers_uses_built_matcher() {
    let matchers = MatcherRegistry::with_defaults();
    let item = matchers
        .build("AnyText", &Arguments::new("AnyText"))
        .unwrap();
    let list = matchers
        .build(
            "AnyListOfMatchers",
            &Arguments::new("AnyListOfMatchers")
                .with_arg("matcher", Value::Matcher(item))
                .with_arg("size", 2),
        )
        .unwrap();

    assert!(list.matches(&Value::from(json!(["a", "b"]))));
    assert!(!list.matches(&Value::from(json!(["a", 1]))));
    assert!(!list.matches(&Value::from(json!(["a"]))));
}

proptest! {
    #[test]
    fn prop_same_seed_same_tagged_values(seed in any::<u64>(), tag in "[a-z]{1,8}") {
        let generators = GeneratorRegistry::with_defaults();
        let args = Arguments::new("Text").with_arg("length", 12);
        let mut a = GenerationSession::seeded(seed);
        let mut b = GenerationSession::seeded(seed);

        let first = generators.generate("Text", &args, Some(&tag), &mut a).unwrap();
        let second = generators.generate("Text", &args, Some(&tag), &mut b).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_integer_within_bounds(seed in any::<u64>(), min in -1000_i64..1000, span in 0_i64..1000) {
        let generators = GeneratorRegistry::with_defaults();
        let mut session = GenerationSession::seeded(seed);
        let args = Arguments::new("Integer").with_arg("min", min).with_arg("max", min + span);
        let value = generators.generate("Integer", &args, None, &mut session).unwrap();
        let n = value.as_i64().unwrap();
        prop_assert!(min <= n && n <= min + span);
    }
}
