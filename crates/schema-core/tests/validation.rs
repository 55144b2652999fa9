use schema_core::Validator;
use serde_json::json;

#[test]
fn basic_ranges_across_keywords() {
    let schema = json!({
        "type": "object",
        "properties": {
            "age": {"type": "integer", "minimum": 0, "maximum": 150},
            "name": {"type": "string", "minLength": 1},
            "tags": {"type": "array", "minItems": 1, "uniqueItems": true}
        },
        "required": ["age", "name"]
    });
    let validator = Validator::for_schema(&schema).unwrap();

    assert!(validator.is_valid(&json!({"age": 30, "name": "Ada", "tags": ["a", "b"]})));
    assert!(!validator.is_valid(&json!({"age": -1, "name": "Ada"})));
    assert!(!validator.is_valid(&json!({"age": 30, "name": ""})));
    assert!(!validator.is_valid(&json!({"age": 30, "name": "Ada", "tags": ["a", "a"]})));
    assert!(!validator.is_valid(&json!({"name": "Ada"})));
}

#[test]
fn recursive_self_reference_validates_nested_categories() {
    let schema = json!({
        "$id": "https://example.com/category",
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "children": {"type": "array", "items": {"$ref": "#"}}
        },
        "required": ["name"]
    });
    let validator = Validator::for_schema(&schema).unwrap();

    let good = json!({
        "name": "root",
        "children": [
            {"name": "a", "children": []},
            {"name": "b", "children": [{"name": "c"}]}
        ]
    });
    assert!(validator.is_valid(&good));

    let bad = json!({"name": "root", "children": [{"children": []}]});
    assert!(!validator.is_valid(&bad));
}

#[test]
fn dynamic_anchor_resolves_against_innermost_caller() {
    let schema = json!({
        "$id": "https://example.com/list",
        "$dynamicAnchor": "node",
        "type": "object",
        "properties": {
            "value": {"$dynamicRef": "#node"}
        }
    });
    let validator = Validator::for_schema(&schema).unwrap();
    assert!(validator.is_valid(&json!({"value": {"value": null}})));
}

#[test]
fn unevaluated_properties_sees_sibling_annotations() {
    let schema = json!({
        "allOf": [
            {"properties": {"a": {"type": "string"}}}
        ],
        "properties": {
            "b": {"type": "string"}
        },
        "unevaluatedProperties": false
    });
    let validator = Validator::for_schema(&schema).unwrap();
    assert!(validator.is_valid(&json!({"a": "x", "b": "y"})));
    assert!(!validator.is_valid(&json!({"a": "x", "b": "y", "c": "z"})));
}

#[test]
fn format_is_annotation_only_by_default() {
    let schema = json!({"type": "string", "format": "email"});
    let validator = Validator::for_schema(&schema).unwrap();
    assert!(validator.is_valid(&json!("not-an-email")));
}

#[test]
fn format_as_assertion_rejects_invalid_values() {
    let schema = json!({"type": "string", "format": "email"});
    let validator = Validator::options().should_assert_format(true).build(&schema).unwrap();
    assert!(validator.is_valid(&json!("ada@example.com")));
    assert!(!validator.is_valid(&json!("not-an-email")));
}

#[test]
fn one_of_rejects_on_zero_or_multiple_matches() {
    let schema = json!({
        "oneOf": [
            {"type": "integer", "multipleOf": 3},
            {"type": "integer", "multipleOf": 5}
        ]
    });
    let validator = Validator::for_schema(&schema).unwrap();
    assert!(validator.is_valid(&json!(3)));
    assert!(validator.is_valid(&json!(5)));
    assert!(!validator.is_valid(&json!(15)));
    assert!(!validator.is_valid(&json!(7)));
}

#[test]
fn not_drops_any_annotations_from_its_subschema() {
    let schema = json!({"not": {"properties": {"a": {"type": "string"}}}});
    let validator = Validator::for_schema(&schema).unwrap();
    let instance = json!({"a": 1});
    let result = validator.evaluate(&instance);
    assert!(result.is_valid());
    assert!(result.root.annotations.is_empty());
}

#[test]
fn exact_rational_multiple_of_avoids_float_rounding() {
    let schema = json!({"type": "number", "multipleOf": 0.01});
    let validator = Validator::for_schema(&schema).unwrap();
    assert!(validator.is_valid(&json!(0.29)));
    assert!(!validator.is_valid(&json!(0.291)));
}

#[test]
fn empty_and_false_schema_boundaries() {
    let always_valid = Validator::for_schema(&json!(true)).unwrap();
    assert!(always_valid.is_valid(&json!(null)));
    assert!(always_valid.is_valid(&json!({"anything": "goes"})));

    let never_valid = Validator::for_schema(&json!(false)).unwrap();
    assert!(!never_valid.is_valid(&json!(null)));
    assert!(!never_valid.is_valid(&json!({})));
}

#[test]
fn max_length_counts_code_points_not_bytes() {
    let schema = json!({"type": "string", "maxLength": 2});
    let validator = Validator::for_schema(&schema).unwrap();
    assert!(validator.is_valid(&json!("\u{1F600}\u{1F600}")));
    assert!(!validator.is_valid(&json!("\u{1F600}\u{1F600}\u{1F600}")));
}

#[test]
fn unique_items_treats_numeric_and_object_equality_structurally() {
    let schema = json!({"type": "array", "uniqueItems": true});
    let validator = Validator::for_schema(&schema).unwrap();
    assert!(!validator.is_valid(&json!([1, 1.0])));
    assert!(!validator.is_valid(&json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}])));
    assert!(validator.is_valid(&json!([{"a": 1}, {"a": 2}])));
}

#[test]
fn additional_properties_false_interacts_with_pattern_properties() {
    let schema = json!({
        "patternProperties": {"^x-": {"type": "string"}},
        "properties": {"name": {"type": "string"}},
        "additionalProperties": false
    });
    let validator = Validator::for_schema(&schema).unwrap();
    assert!(validator.is_valid(&json!({"name": "a", "x-custom": "b"})));
    assert!(!validator.is_valid(&json!({"name": "a", "other": "b"})));
}

#[test]
fn content_keywords_are_annotation_only_by_default() {
    let schema = json!({"type": "string", "contentEncoding": "base64"});
    let validator = Validator::for_schema(&schema).unwrap();
    assert!(validator.is_valid(&json!("not valid base64!!")));
}

#[test]
fn content_keywords_assert_when_enabled() {
    use base64::Engine;
    let schema = json!({"type": "string", "contentEncoding": "base64", "contentMediaType": "application/json"});
    let validator = Validator::options().should_assert_content(true).build(&schema).unwrap();
    let encoded = base64::engine::general_purpose::STANDARD.encode(b"{}");
    assert!(validator.is_valid(&json!(encoded)));
    assert!(!validator.is_valid(&json!("not valid base64!!")));
}

#[test]
fn idempotent_validation_across_repeated_calls() {
    let schema = json!({"type": "integer", "minimum": 0});
    let validator = Validator::for_schema(&schema).unwrap();
    for _ in 0..3 {
        assert!(validator.is_valid(&json!(5)));
        assert!(!validator.is_valid(&json!(-5)));
    }
}
