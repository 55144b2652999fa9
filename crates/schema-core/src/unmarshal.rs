//! "Unmarshal with defaults" (component K, second half, §4.K / §6.2
//! `unmarshal` / §6.4's field-naming contract). Validates the instance, fills
//! in `default`s for properties absent from it (schema-directed, so it walks
//! the original schema document rather than the compiled arena), then
//! deserializes the defaulted value into a caller-provided typed target via
//! `serde`.
//!
//! Field-name mapping (external-name attribute, `-` to exclude, `omitempty`)
//! is, in this host, `serde`'s own `rename`/`skip`/`skip_serializing_if`
//! attributes on the target type — `serde_json::from_value` already honors
//! them, so no separate reflection pass is needed here.
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{error::UnmarshalError, validator::Validator};

/// Populate `target` from `value`, validating against `validator` and
/// filling any `default`-bearing properties absent from `value` first.
///
/// Per §4.K, a failing validation does not abort the coercion: defaults are
/// still applied and `target` is still populated on a best-effort basis, but
/// the returned `Err` carries the validation kind so callers never silently
/// receive a target built from invalid input without knowing it.
///
/// # Errors
/// [`UnmarshalError::Validation`] if `value` fails schema validation,
/// [`UnmarshalError::TypeMismatch`] if the defaulted value cannot be
/// deserialized into `T`.
pub fn unmarshal<T: DeserializeOwned>(validator: &Validator, target: &mut T, value: Value) -> Result<(), UnmarshalError> {
    let defaulted = apply_defaults(validator.schema(), validator, value);
    let result = validator.evaluate(&defaulted);
    let is_valid = result.is_valid();
    let errors: Vec<String> = result
        .to_list()
        .into_iter()
        .map(|(path, message)| format!("{path}: {message}"))
        .collect();
    let decoded: T = serde_json::from_value(defaulted).map_err(|_| UnmarshalError::TypeMismatch {
        expected: std::any::type_name::<T>(),
        found: "incompatible JSON shape",
    })?;
    *target = decoded;
    if !is_valid {
        return Err(UnmarshalError::Validation { errors });
    }
    Ok(())
}

/// Walk `schema` and `value` together, inserting a `properties` entry's
/// `default` wherever the corresponding key is entirely absent from `value`
/// (never when present-but-null: §8.1 distinguishes an explicit `null` —
/// which a sibling `const: null` can still assert against — from an absent
/// field, so only absence triggers defaulting).
///
/// `$ref`/`$dynamicRef` targets are not expanded here; defaults reachable
/// only through a reference are left to the referenced schema's own
/// evaluation and are not filled by this pass.
fn apply_defaults(schema: &Value, validator: &Validator, value: Value) -> Value {
    let Value::Object(schema) = schema else {
        return value;
    };
    let Some(Value::Object(properties)) = schema.get("properties") else {
        return value;
    };
    let mut object = match value {
        Value::Object(object) => object,
        other => return other,
    };
    for (name, subschema) in properties {
        match object.remove(name) {
            Some(existing) => {
                object.insert(name.clone(), apply_defaults(subschema, validator, existing));
            }
            None => {
                if let Some(default) = resolve_default(subschema, validator) {
                    object.insert(name.clone(), default);
                }
            }
        }
    }
    Value::Object(object)
}

/// A literal `default`, or the result of invoking a named producer
/// registered via `defaultFunctions` when the literal is the call-syntax
/// string `"name()"` (§6.3 / §4.K).
fn resolve_default(subschema: &Value, validator: &Validator) -> Option<Value> {
    let Value::Object(object) = subschema else {
        return None;
    };
    let default = object.get("default")?;
    if let Value::String(text) = default {
        if let Some(name) = text.strip_suffix("()") {
            if let Some(producer) = validator.config().default_function(name) {
                return Some(producer.produce());
            }
        }
    }
    Some(default.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    #[serde(default)]
    struct Account {
        name: String,
        age: u64,
        country: String,
        active: bool,
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer"},
                "country": {"type": "string", "default": "US"},
                "active": {"type": "boolean", "default": true}
            },
            "required": ["name", "age"]
        })
    }

    #[test]
    fn fills_missing_defaults() {
        let validator = Validator::for_schema(&schema()).unwrap();
        let mut account = Account::default();
        unmarshal(&validator, &mut account, json!({"name": "Alice", "age": 25})).unwrap();
        assert_eq!(
            account,
            Account { name: "Alice".to_string(), age: 25, country: "US".to_string(), active: true }
        );
    }

    #[test]
    fn explicit_value_overrides_default() {
        let validator = Validator::for_schema(&schema()).unwrap();
        let mut account = Account::default();
        unmarshal(&validator, &mut account, json!({"name": "Bob", "age": 40, "country": "FR"})).unwrap();
        assert_eq!(account.country, "FR");
    }

    #[test]
    fn named_default_function_is_invoked() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "default": "generate_id()"}
            }
        });
        let validator = Validator::options()
            .with_default_function("generate_id", || json!("generated"))
            .build(&schema)
            .unwrap();
        let mut target: Map<String, Value> = Map::new();
        unmarshal(&validator, &mut target, json!({})).unwrap();
        assert_eq!(target.get("id"), Some(&json!("generated")));
    }

    #[test]
    fn invalid_input_still_populates_target_but_errors() {
        let validator = Validator::for_schema(&schema()).unwrap();
        let mut account = Account::default();
        let err = unmarshal(&validator, &mut account, json!({"age": 25})).unwrap_err();
        assert!(matches!(err, UnmarshalError::Validation { .. }));
        assert_eq!(account.age, 25);
    }
}
