//! `prefixItems`, `items`, `contains`/`minContains`/`maxContains`,
//! `minItems`, `maxItems`, `uniqueItems`.
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::{CompileError, ValidationError, ValidationErrorKind},
    keywords::{apply_child, compile_subschema, compile_subschema_at},
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
    let mut prefix_len = 0usize;
    if let Some(Value::Array(schemas)) = object.get("prefixItems") {
        let mut ids = Vec::with_capacity(schemas.len());
        for (index, schema) in schemas.iter().enumerate() {
            ids.push(compile_subschema_at(ctx, arena, "prefixItems", index, schema)?);
        }
        prefix_len = ids.len();
        validators.push(Box::new(PrefixItemsValidator {
            schemas: ids,
            schema_path: ctx.location().pointer.push("prefixItems"),
        }));
    }

    if let Some(schema) = object.get("items") {
        let id = compile_subschema(ctx, arena, "items", schema)?;
        validators.push(Box::new(ItemsValidator {
            schema: id,
            starting_at: prefix_len,
            schema_path: ctx.location().pointer.push("items"),
        }));
    }

    if let Some(schema) = object.get("contains") {
        let id = compile_subschema(ctx, arena, "contains", schema)?;
        let min_contains = object.get("minContains").and_then(Value::as_u64);
        let max_contains = object.get("maxContains").and_then(Value::as_u64);
        validators.push(Box::new(ContainsValidator {
            schema: id,
            min_contains,
            max_contains,
            schema_path: ctx.location().pointer.push("contains"),
        }));
    }

    if let Some(limit) = object.get("minItems").and_then(Value::as_u64) {
        validators.push(Box::new(MinMaxItemsValidator {
            limit,
            is_min: true,
            schema_path: ctx.location().pointer.push("minItems"),
        }));
    }
    if let Some(limit) = object.get("maxItems").and_then(Value::as_u64) {
        validators.push(Box::new(MinMaxItemsValidator {
            limit,
            is_min: false,
            schema_path: ctx.location().pointer.push("maxItems"),
        }));
    }

    if object.get("uniqueItems").and_then(Value::as_bool) == Some(true) {
        validators.push(Box::new(UniqueItemsValidator {
            schema_path: ctx.location().pointer.push("uniqueItems"),
        }));
    }

    Ok(())
}

struct PrefixItemsValidator {
    schemas: Vec<NodeId>,
    schema_path: JsonPointer,
}

impl Validate for PrefixItemsValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Array(items) = instance else {
            return simple_apply(Vec::new());
        };
        let mut errors = Vec::new();
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        for (index, (schema, item)) in self.schemas.iter().zip(items.iter()).enumerate() {
            let item_path = instance_path.push_index(index);
            let (valid, e, _, detail) = apply_child(ctx.arena, *schema, ctx, item, &item_path);
            errors.extend(e);
            children.extend(detail);
            if valid {
                annotations.evaluated_items.insert(index);
            }
        }
        if errors.is_empty() {
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            let _ = &self.schema_path;
            PartialApplication::Invalid { errors, child_results: children }
        }
    }
}

struct ItemsValidator {
    schema: NodeId,
    starting_at: usize,
    schema_path: JsonPointer,
}

impl Validate for ItemsValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Array(items) = instance else {
            return simple_apply(Vec::new());
        };
        let mut errors = Vec::new();
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        for (index, item) in items.iter().enumerate().skip(self.starting_at) {
            let item_path = instance_path.push_index(index);
            let (valid, e, _, detail) = apply_child(ctx.arena, self.schema, ctx, item, &item_path);
            errors.extend(e);
            children.extend(detail);
            if valid {
                annotations.evaluated_items.insert(index);
            }
        }
        if errors.is_empty() {
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            let _ = &self.schema_path;
            PartialApplication::Invalid { errors, child_results: children }
        }
    }
}

struct ContainsValidator {
    schema: NodeId,
    min_contains: Option<u64>,
    max_contains: Option<u64>,
    schema_path: JsonPointer,
}

impl Validate for ContainsValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Array(items) = instance else {
            return simple_apply(Vec::new());
        };
        let mut matched = Annotations::new();
        let mut children = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let item_path = instance_path.push_index(index);
            let (valid, _, _, detail) = apply_child(ctx.arena, self.schema, ctx, item, &item_path);
            if valid {
                matched.evaluated_items.insert(index);
                children.extend(detail);
            }
        }
        let count = matched.evaluated_items.len() as u64;
        let min_ok = self.min_contains.unwrap_or(1) <= count;
        let max_ok = self.max_contains.map_or(true, |max| count <= max);
        if min_ok && max_ok {
            return PartialApplication::Valid {
                annotations: matched,
                child_results: children,
            };
        }
        let kind = if !min_ok {
            ValidationErrorKind::MinContains { limit: self.min_contains.unwrap_or(1), matched: count }
        } else {
            ValidationErrorKind::MaxContains { limit: self.max_contains.unwrap_or(0), matched: count }
        };
        PartialApplication::Invalid {
            errors: vec![ValidationError::new(kind, self.schema_path.clone(), instance_path, instance)],
            child_results: Vec::new(),
        }
    }
}

struct MinMaxItemsValidator {
    limit: u64,
    is_min: bool,
    schema_path: JsonPointer,
}

impl Validate for MinMaxItemsValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Array(items) = instance else {
            return simple_apply(Vec::new());
        };
        let actual = items.len() as u64;
        let ok = if self.is_min { actual >= self.limit } else { actual <= self.limit };
        if ok {
            return simple_apply(Vec::new());
        }
        let kind = if self.is_min {
            ValidationErrorKind::MinItems { limit: self.limit }
        } else {
            ValidationErrorKind::MaxItems { limit: self.limit }
        };
        simple_apply(vec![ValidationError::new(kind, self.schema_path.clone(), instance_path, instance)])
    }
}

struct UniqueItemsValidator {
    schema_path: JsonPointer,
}

impl Validate for UniqueItemsValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Array(items) = instance else {
            return simple_apply(Vec::new());
        };
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                if crate::number::json_equal(a, b) {
                    return simple_apply(vec![ValidationError::new(
                        ValidationErrorKind::UniqueItems,
                        self.schema_path.clone(),
                        instance_path,
                        instance,
                    )]);
                }
            }
        }
        simple_apply(Vec::new())
    }
}
