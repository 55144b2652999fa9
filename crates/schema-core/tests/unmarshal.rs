use schema_core::{unmarshal, IntoInstance, Validator};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
struct Profile {
    name: String,
    country: String,
    active: bool,
}

fn profile_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "country": {"type": "string", "default": "US"},
            "active": {"type": "boolean", "default": true}
        },
        "required": ["name"]
    })
}

#[test]
fn unmarshal_fills_defaults_for_absent_fields_only() {
    let validator = Validator::for_schema(&profile_schema()).unwrap();
    let mut profile = Profile::default();
    unmarshal(&validator, &mut profile, json!({"name": "Grace"})).unwrap();
    assert_eq!(profile, Profile { name: "Grace".to_string(), country: "US".to_string(), active: true });
}

#[test]
fn unmarshal_never_overwrites_an_explicit_null() {
    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    struct Nullable {
        #[serde(default)]
        country: Option<String>,
    }
    let schema = json!({
        "type": "object",
        "properties": {"country": {"type": ["string", "null"], "default": "US"}}
    });
    let validator = Validator::for_schema(&schema).unwrap();
    let mut target = Nullable::default();
    unmarshal(&validator, &mut target, json!({"country": null})).unwrap();
    assert_eq!(target.country, None);
}

#[test]
fn unmarshal_surfaces_validation_failure_but_still_populates_target() {
    let validator = Validator::for_schema(&profile_schema()).unwrap();
    let mut profile = Profile::default();
    let err = unmarshal(&validator, &mut profile, json!({})).unwrap_err();
    assert!(matches!(err, schema_core::UnmarshalError::Validation { .. }));
    assert_eq!(profile.country, "US");
}

#[test]
fn byte_slice_input_is_parsed_as_json() {
    let bytes: &[u8] = br#"{"age": 30}"#;
    let value = bytes.into_instance().unwrap();
    assert_eq!(value, json!({"age": 30}));
}

#[test]
fn str_input_is_parsed_as_json() {
    let text = r#"{"age": 30}"#;
    let value = text.into_instance().unwrap();
    assert_eq!(value, json!({"age": 30}));
}

#[test]
fn typed_record_reflects_through_serde_into_a_value() {
    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }
    let value = schema_core::input::TypedRecord(Point { x: 1, y: 2 }).into_instance().unwrap();
    assert_eq!(value, json!({"x": 1, "y": 2}));
}
