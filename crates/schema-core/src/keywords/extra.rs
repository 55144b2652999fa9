//! Keywords the compiler does not recognize. When the compiler is
//! configured to preserve them (`preserveExtra`, §3.1 "Extra"), they are
//! retained verbatim and surfaced as an annotation so they participate in
//! round-trip output the same way `title`/`description`/`examples` do
//! (§8.1 "Round-trip"). They never affect validation.
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::CompileError,
    output::{Annotations, PartialApplication},
    paths::JsonPointerNode,
    validator::{EvalContext, Validate},
};

const RECOGNIZED_KEYWORDS: &[&str] = &[
    "$ref",
    "$dynamicRef",
    "$dynamicAnchor",
    "$anchor",
    "$id",
    "$schema",
    "$defs",
    "$comment",
    "type",
    "enum",
    "const",
    "multipleOf",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "prefixItems",
    "items",
    "contains",
    "minContains",
    "maxContains",
    "minItems",
    "maxItems",
    "uniqueItems",
    "properties",
    "patternProperties",
    "additionalProperties",
    "propertyNames",
    "minProperties",
    "maxProperties",
    "required",
    "dependentRequired",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    "dependentSchemas",
    "contentEncoding",
    "contentMediaType",
    "contentSchema",
    "title",
    "description",
    "default",
    "examples",
    "deprecated",
    "readOnly",
    "writeOnly",
    "unevaluatedProperties",
    "unevaluatedItems",
];

pub(crate) fn compile(
    ctx: &Context<'_>,
    object: &Map<String, Value>,
    validators: &mut Vec<Box<dyn Validate>>,
) -> Result<(), CompileError> {
    if !ctx.config().preserve_extra() {
        return Ok(());
    }
    let mut values = Map::new();
    for (name, value) in object {
        if RECOGNIZED_KEYWORDS.contains(&name.as_str()) || ctx.config.custom_keywords.contains_key(name) {
            continue;
        }
        values.insert(name.clone(), value.clone());
    }
    if !values.is_empty() {
        validators.push(Box::new(ExtraValidator { values }));
    }
    Ok(())
}

struct ExtraValidator {
    values: Map<String, Value>,
}

impl Validate for ExtraValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, _instance: &'i Value, _instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        PartialApplication::Valid {
            annotations: Annotations {
                values: self.values.clone(),
                ..Annotations::new()
            },
            child_results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::validator::Validator;

    #[test]
    fn unknown_keywords_are_dropped_by_default() {
        let schema = json!({"type": "string", "x-internal-id": "abc123"});
        let validator = Validator::for_schema(&schema).unwrap();
        let instance = json!("hi");
        let result = validator.evaluate(&instance);
        assert!(result.root.annotations.values.get("x-internal-id").is_none());
    }

    #[test]
    fn unknown_keywords_round_trip_through_annotations_when_preserved() {
        let schema = json!({"type": "string", "x-internal-id": "abc123"});
        let validator = Validator::options().should_preserve_extra(true).build(&schema).unwrap();
        let result = validator.evaluate(&json!("hi"));
        assert_eq!(
            result.root.annotations.values.get("x-internal-id"),
            Some(&json!("abc123"))
        );
    }

    #[test]
    fn unknown_keywords_never_affect_validation() {
        let schema = json!({"type": "string", "x-internal-id": 12345});
        let validator = Validator::options().should_preserve_extra(true).build(&schema).unwrap();
        assert!(validator.is_valid(&json!("hi")));
    }
}
