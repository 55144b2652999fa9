//! `allOf`, `anyOf`, `oneOf`, `not`, `if`/`then`/`else`, `dependentSchemas`
//! (component D, verdict-based combination per §4.D/§4.I).
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::{CompileError, ValidationError, ValidationErrorKind},
    keywords::{apply_child, compile_subschema, compile_subschema_at, compile_subschema_named},
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
    if let Some(Value::Array(schemas)) = object.get("allOf") {
        let ids = compile_each(ctx, arena, "allOf", schemas)?;
        validators.push(Box::new(AllOfValidator { schemas: ids }));
    }

    if let Some(Value::Array(schemas)) = object.get("anyOf") {
        let ids = compile_each(ctx, arena, "anyOf", schemas)?;
        validators.push(Box::new(AnyOfValidator {
            schemas: ids,
            schema_path: ctx.location().pointer.push("anyOf"),
        }));
    }

    if let Some(Value::Array(schemas)) = object.get("oneOf") {
        let ids = compile_each(ctx, arena, "oneOf", schemas)?;
        validators.push(Box::new(OneOfValidator {
            schemas: ids,
            schema_path: ctx.location().pointer.push("oneOf"),
        }));
    }

    if let Some(schema) = object.get("not") {
        let id = compile_subschema(ctx, arena, "not", schema)?;
        validators.push(Box::new(NotValidator {
            schema: id,
            schema_path: ctx.location().pointer.push("not"),
        }));
    }

    if let Some(if_schema) = object.get("if") {
        let if_id = compile_subschema(ctx, arena, "if", if_schema)?;
        let then_id = object.get("then").map(|s| compile_subschema(ctx, arena, "then", s)).transpose()?;
        let else_id = object.get("else").map(|s| compile_subschema(ctx, arena, "else", s)).transpose()?;
        validators.push(Box::new(IfThenElseValidator {
            if_schema: if_id,
            then_schema: then_id,
            else_schema: else_id,
        }));
    }

    if let Some(Value::Object(dependent)) = object.get("dependentSchemas") {
        let mut pairs = Vec::with_capacity(dependent.len());
        for (trigger, subschema) in dependent {
            let id = compile_subschema_named(ctx, arena, "dependentSchemas", trigger, subschema)?;
            pairs.push((trigger.clone(), id));
        }
        validators.push(Box::new(DependentSchemasValidator { pairs }));
    }

    Ok(())
}

fn compile_each(ctx: &Context<'_>, arena: &mut Arena, keyword: &'static str, schemas: &[Value]) -> Result<Vec<NodeId>, CompileError> {
    schemas
        .iter()
        .enumerate()
        .map(|(index, schema)| compile_subschema_at(ctx, arena, keyword, index, schema))
        .collect()
}

struct AllOfValidator {
    schemas: Vec<NodeId>,
}

impl Validate for AllOfValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let mut errors = Vec::new();
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        for &id in &self.schemas {
            let (_, e, a, detail) = apply_child(ctx.arena, id, ctx, instance, instance_path);
            errors.extend(e);
            annotations.merge(a);
            children.extend(detail);
        }
        if errors.is_empty() {
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            PartialApplication::Invalid { errors, child_results: children }
        }
    }
}

struct AnyOfValidator {
    schemas: Vec<NodeId>,
    schema_path: JsonPointer,
}

impl Validate for AnyOfValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        let mut any_valid = false;
        for &id in &self.schemas {
            let (valid, _, a, detail) = apply_child(ctx.arena, id, ctx, instance, instance_path);
            children.extend(detail);
            if valid {
                any_valid = true;
                annotations.merge(a);
            }
        }
        if any_valid {
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            PartialApplication::Invalid {
                errors: vec![ValidationError::new(ValidationErrorKind::AnyOf, self.schema_path.clone(), instance_path, instance)],
                child_results: children,
            }
        }
    }
}

struct OneOfValidator {
    schemas: Vec<NodeId>,
    schema_path: JsonPointer,
}

impl Validate for OneOfValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let mut children = Vec::new();
        let mut matched = Vec::new();
        for &id in &self.schemas {
            let (valid, _, a, detail) = apply_child(ctx.arena, id, ctx, instance, instance_path);
            children.extend(detail);
            if valid {
                matched.push(a);
            }
        }
        match matched.len() {
            1 => {
                let annotations = matched.into_iter().next().unwrap();
                PartialApplication::Valid { annotations, child_results: children }
            }
            0 => PartialApplication::Invalid {
                errors: vec![ValidationError::new(ValidationErrorKind::OneOfNotValid, self.schema_path.clone(), instance_path, instance)],
                child_results: children,
            },
            _ => PartialApplication::Invalid {
                errors: vec![ValidationError::new(
                    ValidationErrorKind::OneOfMultipleValid,
                    self.schema_path.clone(),
                    instance_path,
                    instance,
                )],
                child_results: children,
            },
        }
    }
}

struct NotValidator {
    schema: NodeId,
    schema_path: JsonPointer,
}

impl Validate for NotValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let node = ctx.node(self.schema);
        if node.is_valid(ctx, instance) {
            simple_apply(vec![ValidationError::new(ValidationErrorKind::Not, self.schema_path.clone(), instance_path, instance)])
        } else {
            simple_apply(Vec::new())
        }
    }
}

struct IfThenElseValidator {
    if_schema: NodeId,
    then_schema: Option<NodeId>,
    else_schema: Option<NodeId>,
}

impl Validate for IfThenElseValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let if_node = ctx.node(self.if_schema);
        if if_node.is_valid(ctx, instance) {
            match self.then_schema {
                Some(id) => {
                    let (valid, errors, annotations, children) = apply_child(ctx.arena, id, ctx, instance, instance_path);
                    fold(valid, errors, annotations, children)
                }
                None => simple_apply(Vec::new()),
            }
        } else {
            match self.else_schema {
                Some(id) => {
                    let (valid, errors, annotations, children) = apply_child(ctx.arena, id, ctx, instance, instance_path);
                    fold(valid, errors, annotations, children)
                }
                None => simple_apply(Vec::new()),
            }
        }
    }
}

fn fold<'i>(valid: bool, errors: Vec<ValidationError<'i>>, annotations: Annotations, children: Vec<crate::output::DetailNode<'i>>) -> PartialApplication<'i> {
    if valid {
        PartialApplication::Valid { annotations, child_results: children }
    } else {
        PartialApplication::Invalid { errors, child_results: children }
    }
}

struct DependentSchemasValidator {
    pairs: Vec<(String, NodeId)>,
}

impl Validate for DependentSchemasValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Object(map) = instance else {
            return simple_apply(Vec::new());
        };
        let mut errors = Vec::new();
        let mut annotations = Annotations::new();
        let mut children = Vec::new();
        for (trigger, id) in &self.pairs {
            if !map.contains_key(trigger) {
                continue;
            }
            let (_, e, a, detail) = apply_child(ctx.arena, *id, ctx, instance, instance_path);
            errors.extend(e);
            annotations.merge(a);
            children.extend(detail);
        }
        if errors.is_empty() {
            PartialApplication::Valid { annotations, child_results: children }
        } else {
            PartialApplication::Invalid { errors, child_results: children }
        }
    }
}
