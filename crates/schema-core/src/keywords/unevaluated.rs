//! `unevaluatedProperties`, `unevaluatedItems` (§4.I point 6). Must compile
//! after every other keyword group so the annotations they inspect already
//! reflect every sibling keyword's contribution (see
//! [`crate::compiler::compile_keywords`]'s call order).
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::{CompileError, ValidationError, ValidationErrorKind},
    keywords::{apply_child, compile_subschema},
    node::{Arena, NodeId},
    output::{Annotations, PartialApplication},
    paths::{JsonPointer, JsonPointerNode},
    validator::{simple_apply, EvalContext, Validate},
};

pub(crate) fn compile(
    ctx: &Context<'_>,
    arena: &mut Arena,
    object: &Map<String, Value>,
    validators: &mut Vec<Box<dyn Validate>>,
) -> Result<(), CompileError> {
    if let Some(schema) = object.get("unevaluatedProperties") {
        let id = compile_subschema(ctx, arena, "unevaluatedProperties", schema)?;
        validators.push(Box::new(UnevaluatedPropertiesValidator {
            schema: id,
            schema_path: ctx.location().pointer.push("unevaluatedProperties"),
        }));
    }
    if let Some(schema) = object.get("unevaluatedItems") {
        let id = compile_subschema(ctx, arena, "unevaluatedItems", schema)?;
        validators.push(Box::new(UnevaluatedItemsValidator {
            schema: id,
            schema_path: ctx.location().pointer.push("unevaluatedItems"),
        }));
    }
    Ok(())
}

fn known_annotations(ctx: &EvalContext<'_>) -> Annotations {
    ctx.sibling_annotations
        .map(|scratch| scratch.borrow().clone())
        .unwrap_or_default()
}

struct UnevaluatedPropertiesValidator {
    schema: NodeId,
    schema_path: JsonPointer,
}

impl Validate for UnevaluatedPropertiesValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Object(map) = instance else {
            return simple_apply(Vec::new());
        };
        let known = known_annotations(ctx);
        let mut errors = Vec::new();
        let mut unexpected = Vec::new();
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        for (key, value) in map {
            if known.evaluated_properties.contains(key) {
                continue;
            }
            let prop_path = instance_path.push_key(key);
            let (valid, e, _, detail) = apply_child(ctx.arena, self.schema, ctx, value, &prop_path);
            children.extend(detail);
            if valid {
                annotations.evaluated_properties.insert(key.clone());
            } else {
                unexpected.push(key.clone());
                errors.extend(e);
            }
        }
        if errors.is_empty() {
            let _ = unexpected;
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            PartialApplication::Invalid {
                errors: vec![ValidationError::new(
                    ValidationErrorKind::UnevaluatedProperties { unexpected },
                    self.schema_path.clone(),
                    instance_path,
                    instance,
                )],
                child_results: children,
            }
        }
    }
}

struct UnevaluatedItemsValidator {
    schema: NodeId,
    schema_path: JsonPointer,
}

impl Validate for UnevaluatedItemsValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Array(items) = instance else {
            return simple_apply(Vec::new());
        };
        let known = known_annotations(ctx);
        let mut unexpected = Vec::new();
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if known.evaluated_items.contains(&index) {
                continue;
            }
            let item_path = instance_path.push_index(index);
            let (valid, _, _, detail) = apply_child(ctx.arena, self.schema, ctx, item, &item_path);
            children.extend(detail);
            if valid {
                annotations.evaluated_items.insert(index);
            } else {
                unexpected.push(index);
            }
        }
        if unexpected.is_empty() {
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            PartialApplication::Invalid {
                errors: vec![ValidationError::new(
                    ValidationErrorKind::UnevaluatedItems { indices: unexpected },
                    self.schema_path.clone(),
                    instance_path,
                    instance,
                )],
                child_results: children,
            }
        }
    }
}
