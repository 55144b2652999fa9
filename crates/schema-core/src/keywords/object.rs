//! `properties`, `patternProperties`, `additionalProperties`,
//! `propertyNames`, `minProperties`, `maxProperties`, `required`,
//! `dependentRequired`.
use std::sync::Arc;

use fancy_regex::Regex;
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::{CompileError, ValidationError, ValidationErrorKind},
    keywords::{apply_child, compile_subschema, compile_subschema_named},
    node::{Arena, NodeId},
    output::{Annotations, PartialApplication},
    paths::{JsonPointer, JsonPointerNode},
    properties::{self, PropertiesValidatorsMap},
    validator::{simple_apply, EvalContext, Validate},
};

pub(crate) fn compile(
    ctx: &Context<'_>,
    arena: &mut Arena,
    object: &Map<String, Value>,
    validators: &mut Vec<Box<dyn Validate>>,
) -> Result<(), CompileError> {
    let mut properties_map: Option<Arc<Box<dyn PropertiesValidatorsMap>>> = None;
    if let Some(Value::Object(props)) = object.get("properties") {
        let mut entries = Vec::with_capacity(props.len());
        for (name, subschema) in props {
            let id = compile_subschema_named(ctx, arena, "properties", name, subschema)?;
            entries.push((name.clone(), id));
        }
        let map = properties::compile_properties_map(entries);
        properties_map = Some(Arc::new(map));
        validators.push(Box::new(PropertiesValidator {
            map: Arc::clone(properties_map.as_ref().unwrap()),
            schema_path: ctx.location().pointer.push("properties"),
        }));
    }

    let mut patterns: Arc<Vec<(Arc<Regex>, NodeId)>> = Arc::new(Vec::new());
    if let Some(Value::Object(pattern_props)) = object.get("patternProperties") {
        let compiled = properties::compile_patterns(pattern_props, |pattern, subschema| {
            compile_subschema_named(ctx, arena, "patternProperties", pattern, subschema)
        })?;
        patterns = Arc::new(compiled);
        validators.push(Box::new(PatternPropertiesValidator {
            patterns: Arc::clone(&patterns),
            schema_path: ctx.location().pointer.push("patternProperties"),
        }));
    }

    if let Some(schema) = object.get("additionalProperties") {
        let id = compile_subschema(ctx, arena, "additionalProperties", schema)?;
        validators.push(Box::new(AdditionalPropertiesValidator {
            schema: id,
            properties: properties_map.clone(),
            patterns: Arc::clone(&patterns),
            schema_path: ctx.location().pointer.push("additionalProperties"),
        }));
    }

    if let Some(schema) = object.get("propertyNames") {
        let id = compile_subschema(ctx, arena, "propertyNames", schema)?;
        validators.push(Box::new(PropertyNamesValidator {
            schema: id,
            schema_path: ctx.location().pointer.push("propertyNames"),
        }));
    }

    if let Some(limit) = object.get("minProperties").and_then(Value::as_u64) {
        validators.push(Box::new(MinMaxPropertiesValidator {
            limit,
            is_min: true,
            schema_path: ctx.location().pointer.push("minProperties"),
        }));
    }
    if let Some(limit) = object.get("maxProperties").and_then(Value::as_u64) {
        validators.push(Box::new(MinMaxPropertiesValidator {
            limit,
            is_min: false,
            schema_path: ctx.location().pointer.push("maxProperties"),
        }));
    }

    if let Some(Value::Array(required)) = object.get("required") {
        let names: Vec<String> = required.iter().filter_map(Value::as_str).map(str::to_string).collect();
        validators.push(Box::new(RequiredValidator {
            names,
            schema_path: ctx.location().pointer.push("required"),
        }));
    }

    if let Some(Value::Object(dependent)) = object.get("dependentRequired") {
        let mut pairs = Vec::with_capacity(dependent.len());
        for (property, required) in dependent {
            if let Value::Array(required) = required {
                let names: Vec<String> = required.iter().filter_map(Value::as_str).map(str::to_string).collect();
                pairs.push((property.clone(), names));
            }
        }
        validators.push(Box::new(DependentRequiredValidator {
            pairs,
            schema_path: ctx.location().pointer.push("dependentRequired"),
        }));
    }

    Ok(())
}

struct PropertiesValidator {
    map: Arc<Box<dyn PropertiesValidatorsMap>>,
    schema_path: JsonPointer,
}

impl Validate for PropertiesValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Object(map) = instance else {
            return simple_apply(Vec::new());
        };
        let mut errors = Vec::new();
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        for (key, value) in map {
            if let Some(id) = self.map.get(key) {
                let prop_path = instance_path.push_key(key);
                let (valid, e, _, detail) = apply_child(ctx.arena, id, ctx, value, &prop_path);
                errors.extend(e);
                children.extend(detail);
                if valid {
                    annotations.evaluated_properties.insert(key.clone());
                }
            }
        }
        if errors.is_empty() {
            let _ = &self.schema_path;
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            PartialApplication::Invalid { errors, child_results: children }
        }
    }
}

struct PatternPropertiesValidator {
    patterns: Arc<Vec<(Arc<Regex>, NodeId)>>,
    schema_path: JsonPointer,
}

impl Validate for PatternPropertiesValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Object(map) = instance else {
            return simple_apply(Vec::new());
        };
        let mut errors = Vec::new();
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        for (key, value) in map {
            let matches = properties::matching_patterns(&self.patterns, key);
            if matches.is_empty() {
                continue;
            }
            let prop_path = instance_path.push_key(key);
            let mut all_valid = true;
            for id in matches {
                let (valid, e, _, detail) = apply_child(ctx.arena, id, ctx, value, &prop_path);
                errors.extend(e);
                children.extend(detail);
                all_valid &= valid;
            }
            if all_valid {
                annotations.evaluated_properties.insert(key.clone());
            }
        }
        if errors.is_empty() {
            let _ = &self.schema_path;
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            PartialApplication::Invalid { errors, child_results: children }
        }
    }
}

struct AdditionalPropertiesValidator {
    schema: NodeId,
    properties: Option<Arc<Box<dyn PropertiesValidatorsMap>>>,
    patterns: Arc<Vec<(Arc<Regex>, NodeId)>>,
    schema_path: JsonPointer,
}

impl Validate for AdditionalPropertiesValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Object(map) = instance else {
            return simple_apply(Vec::new());
        };
        let mut errors = Vec::new();
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        for (key, value) in map {
            let named = self.properties.as_ref().is_some_and(|m| m.get(key).is_some());
            let pattern_matched = !properties::matching_patterns(&self.patterns, key).is_empty();
            if named || pattern_matched {
                continue;
            }
            let prop_path = instance_path.push_key(key);
            let (valid, e, _, detail) = apply_child(ctx.arena, self.schema, ctx, value, &prop_path);
            errors.extend(e);
            children.extend(detail);
            if valid {
                annotations.evaluated_properties.insert(key.clone());
            }
        }
        if errors.is_empty() {
            let _ = &self.schema_path;
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            PartialApplication::Invalid { errors, child_results: children }
        }
    }
}

struct PropertyNamesValidator {
    schema: NodeId,
    schema_path: JsonPointer,
}

impl Validate for PropertyNamesValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Object(map) = instance else {
            return simple_apply(Vec::new());
        };
        let mut errors = Vec::new();
        for key in map.keys() {
            let name_value = Value::String(key.clone());
            let node = ctx.node(self.schema);
            if !node.is_valid(ctx, &name_value) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::PropertyNames { property: key.clone() },
                    self.schema_path.clone(),
                    instance_path,
                    instance,
                ));
            }
        }
        simple_apply(errors)
    }
}

struct MinMaxPropertiesValidator {
    limit: u64,
    is_min: bool,
    schema_path: JsonPointer,
}

impl Validate for MinMaxPropertiesValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Object(map) = instance else {
            return simple_apply(Vec::new());
        };
        let actual = map.len() as u64;
        let ok = if self.is_min { actual >= self.limit } else { actual <= self.limit };
        if ok {
            return simple_apply(Vec::new());
        }
        let kind = if self.is_min {
            ValidationErrorKind::MinProperties { limit: self.limit }
        } else {
            ValidationErrorKind::MaxProperties { limit: self.limit }
        };
        simple_apply(vec![ValidationError::new(kind, self.schema_path.clone(), instance_path, instance)])
    }
}

struct RequiredValidator {
    names: Vec<String>,
    schema_path: JsonPointer,
}

impl Validate for RequiredValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Object(map) = instance else {
            return simple_apply(Vec::new());
        };
        let errors = self
            .names
            .iter()
            .filter(|name| !map.contains_key(*name))
            .map(|name| {
                ValidationError::new(
                    ValidationErrorKind::Required { property: name.clone() },
                    self.schema_path.clone(),
                    instance_path,
                    instance,
                )
            })
            .collect();
        simple_apply(errors)
    }
}

struct DependentRequiredValidator {
    pairs: Vec<(String, Vec<String>)>,
    schema_path: JsonPointer,
}

impl Validate for DependentRequiredValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Object(map) = instance else {
            return simple_apply(Vec::new());
        };
        let mut errors = Vec::new();
        for (trigger, required) in &self.pairs {
            if !map.contains_key(trigger) {
                continue;
            }
            for name in required {
                if !map.contains_key(name) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::DependentRequired {
                            property: trigger.clone(),
                            missing: name.clone(),
                        },
                        self.schema_path.clone(),
                        instance_path,
                        instance,
                    ));
                }
            }
        }
        simple_apply(errors)
    }
}
