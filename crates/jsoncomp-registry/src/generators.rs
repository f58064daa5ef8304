//! Built-in generators
//!
//! | name | parameters | output |
//! |---|---|---|
//! | `FirstName` | `gender = "male"` | first name from the male or female list |
//! | `LastName` | | last name |
//! | `Integer` | `min = 0`, `max = 100` | integer in `min..=max` |
//! | `Float` | `min = 0.0`, `max = 1.0` | float in `min..max`; `max - min` must be finite |
//! | `Choice` | `options` | one element of a non-empty array |
//! | `Text` | `length = 8`, at most 65536 | lowercase alphanumeric string |
//! | `Uuid` | | random version 4 UUID string |

use crate::arguments::Arguments;
use crate::error::RegistryError;
use crate::generator::{GeneratorRegistry, GeneratorRng};
use jsoncomp_document::Value;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

const MALE_NAMES: &[&str] = &[
    "James", "John", "Alex", "Keanu", "Michel", "Aaron", "Richard", "Ricardo",
];

const FEMALE_NAMES: &[&str] = &[
    "Karen", "Kate", "Maria", "Marry", "Lucia", "Tiffany", "Aki", "Noelle",
];

const LAST_NAMES: &[&str] = &[
    "Harris",
    "Robinson",
    "Walker",
    "Reaves",
    "Smith",
    "Levi",
    "Yamamoto",
    "Brodski",
    "Danielopoulos",
    "McNuggets",
    "Lopez",
    "Hernandez",
];

const TEXT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Longest string `Text` produces
pub const MAX_TEXT_LENGTH: usize = 1 << 16;

pub(crate) fn install(registry: &mut GeneratorRegistry) {
    registry.register_or_replace("FirstName", first_name);
    registry.register_or_replace("LastName", last_name);
    registry.register_or_replace("Integer", integer);
    registry.register_or_replace("Float", float);
    registry.register_or_replace("Choice", choice);
    registry.register_or_replace("Text", text);
    registry.register_or_replace("Uuid", uuid);
}

fn pick(names: &[&str], rng: &mut GeneratorRng) -> Value {
    names.choose(rng).copied().map_or(Value::Null, Value::from)
}

/// First name; any gender other than `male` selects the female list
pub fn first_name(args: &Arguments, rng: &mut GeneratorRng) -> Result<Value, RegistryError> {
    args.ensure_known(&["gender"])?;
    let gender = args.opt_str(0, "gender")?.unwrap_or("male");
    let names = if gender.trim().eq_ignore_ascii_case("male") {
        MALE_NAMES
    } else {
        FEMALE_NAMES
    };
    Ok(pick(names, rng))
}

/// Last name
pub fn last_name(args: &Arguments, rng: &mut GeneratorRng) -> Result<Value, RegistryError> {
    args.ensure_known(&[])?;
    Ok(pick(LAST_NAMES, rng))
}

/// Integer in an inclusive range
pub fn integer(args: &Arguments, rng: &mut GeneratorRng) -> Result<Value, RegistryError> {
    args.ensure_known(&["min", "max"])?;
    let min = args.opt_i64(0, "min")?.unwrap_or(0);
    let max = args.opt_i64(1, "max")?.unwrap_or(100);
    if min > max {
        return Err(args.invalid("min", format!("{min} is greater than max {max}")));
    }
    Ok(Value::from(rng.random_range(min..=max)))
}

/// Float in a half-open range
pub fn float(args: &Arguments, rng: &mut GeneratorRng) -> Result<Value, RegistryError> {
    args.ensure_known(&["min", "max"])?;
    let min = args.opt_f64(0, "min")?.unwrap_or(0.0);
    let max = args.opt_f64(1, "max")?.unwrap_or(1.0);
    if min > max {
        return Err(args.invalid("min", format!("{min} is greater than max {max}")));
    }
    let span = max - min;
    if !span.is_finite() {
        return Err(args.invalid("max", format!("range {min}..{max} is too wide")));
    }
    if span < f64::EPSILON {
        return Ok(Value::from(min));
    }
    Ok(Value::from(rng.random_range(min..max)))
}

/// One element of `options`
pub fn choice(args: &Arguments, rng: &mut GeneratorRng) -> Result<Value, RegistryError> {
    args.ensure_known(&["options"])?;
    let options = args
        .value(0, "options")?
        .as_array()
        .ok_or_else(|| args.invalid("options", "expected array"))?;
    options
        .choose(rng)
        .cloned()
        .ok_or_else(|| args.invalid("options", "must not be empty"))
}

/// Random lowercase alphanumeric string
pub fn text(args: &Arguments, rng: &mut GeneratorRng) -> Result<Value, RegistryError> {
    args.ensure_known(&["length"])?;
    let length = args.opt_usize(0, "length")?.unwrap_or(8);
    if length > MAX_TEXT_LENGTH {
        return Err(args.invalid(
            "length",
            format!("{length} exceeds the maximum of {MAX_TEXT_LENGTH}"),
        ));
    }
    let text: String = (0..length)
        .map(|_| char::from(TEXT_ALPHABET[rng.random_range(0..TEXT_ALPHABET.len())]))
        .collect();
    Ok(Value::from(text))
}

/// Random version 4 UUID
pub fn uuid(args: &Arguments, rng: &mut GeneratorRng) -> Result<Value, RegistryError> {
    args.ensure_known(&[])?;
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    let id = uuid::Builder::from_random_bytes(bytes).into_uuid();
    Ok(Value::from(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerationSession;
    use serde_json::json;

    fn generate(name: &str, args: Arguments) -> Result<Value, RegistryError> {
        GeneratorRegistry::with_defaults().generate(
            name,
            &args,
            None,
            &mut GenerationSession::seeded(7),
        )
    }

    #[test]
    fn defaults_registered() {
        let registry = GeneratorRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec!["FirstName", "LastName", "Integer", "Float", "Choice", "Text", "Uuid"]
        );
    }

    #[test]
    fn first_name_by_gender() {
        let male = generate("FirstName", Arguments::new("FirstName")).unwrap();
        assert!(MALE_NAMES.contains(&male.as_str().unwrap()));

        let female = generate(
            "FirstName",
            Arguments::new("FirstName").with_arg("gender", "female"),
        )
        .unwrap();
        assert!(FEMALE_NAMES.contains(&female.as_str().unwrap()));

        let positional = generate(
            "FirstName",
            Arguments::new("FirstName").with_positional(vec![Value::from(" Male ")]),
        )
        .unwrap();
        assert!(MALE_NAMES.contains(&positional.as_str().unwrap()));
    }

    #[test]
    fn last_name_rejects_arguments() {
        let err = generate("LastName", Arguments::new("LastName").with_arg("x", 1)).unwrap_err();
        assert!(matches!(err, RegistryError::UnexpectedArgument { .. }));
    }

    #[test]
    fn integer_in_range() {
        for _ in 0..20 {
            let value = generate(
                "Integer",
                Arguments::new("Integer").with_positional(vec![Value::from(3), Value::from(5)]),
            )
            .unwrap();
            let n = value.as_i64().unwrap();
            assert!((3..=5).contains(&n));
        }
        assert!(generate(
            "Integer",
            Arguments::new("Integer").with_arg("min", 9).with_arg("max", 1)
        )
        .is_err());
    }

    #[test]
    fn float_degenerate_range() {
        let value = generate(
            "Float",
            Arguments::new("Float").with_arg("min", 2.5).with_arg("max", 2.5),
        )
        .unwrap();
        assert_eq!(value, Value::from(2.5));
    }

    #[test]
    fn float_rejects_overflowing_range() {
        let err = generate(
            "Float",
            Arguments::new("Float").with_arg("min", -1e308).with_arg("max", 1e308),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument { .. }));
        assert!(err.to_string().contains("max"));

        let value = generate(
            "Float",
            Arguments::new("Float").with_arg("min", -1e307).with_arg("max", 1e307),
        )
        .unwrap();
        let x = value.as_f64().unwrap();
        assert!((-1e307..1e307).contains(&x));
    }

    #[test]
    fn choice_from_options() {
        let value = generate(
            "Choice",
            Arguments::new("Choice").with_arg("options", Value::from(json!(["a", "b"]))),
        )
        .unwrap();
        assert!(value == Value::from("a") || value == Value::from("b"));

        let empty = generate(
            "Choice",
            Arguments::new("Choice").with_arg("options", Value::from(json!([]))),
        );
        assert!(matches!(empty, Err(RegistryError::InvalidArgument { .. })));
    }

    #[test]
    fn text_length() {
        let value = generate("Text", Arguments::new("Text").with_arg("length", 12)).unwrap();
        let text = value.as_str().unwrap();
        assert_eq!(text.len(), 12);
        assert!(text.bytes().all(|b| TEXT_ALPHABET.contains(&b)));
    }

    #[test]
    fn text_length_is_bounded() {
        let longest = generate(
            "Text",
            Arguments::new("Text").with_arg("length", MAX_TEXT_LENGTH as u64),
        )
        .unwrap();
        assert_eq!(longest.as_str().unwrap().len(), MAX_TEXT_LENGTH);

        let err = generate(
            "Text",
            Arguments::new("Text").with_arg("length", 1_000_000_000_000_u64),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument { .. }));
    }

    #[test]
    fn uuid_is_v4() {
        let value = generate("Uuid", Arguments::new("Uuid")).unwrap();
        let parsed = uuid::Uuid::parse_str(value.as_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }
}
