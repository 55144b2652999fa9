//! `$ref` / `$dynamicRef` (component H, §4.H).
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::{CompileError, ValidationErrorKind},
    node::{Arena, NodeId},
    output::PartialApplication,
    paths::JsonPointerNode,
    validator::{EvalContext, Validate},
};

pub(crate) fn compile(
    ctx: &Context<'_>,
    arena: &mut Arena,
    object: &Map<String, Value>,
    validators: &mut Vec<Box<dyn Validate>>,
) -> Result<(), CompileError> {
    if let Some(Value::String(reference)) = object.get("$ref") {
        let (target_value, target_base, target_pointer) = ctx.resolve_reference(reference)?;
        let target_ctx = ctx.with_location(target_base, target_pointer);
        let id = crate::compiler::compile_schema(&target_ctx, arena, &target_value)?;
        validators.push(Box::new(RefValidator { target: id }));
    }
    if let Some(Value::String(reference)) = object.get("$dynamicRef") {
        let anchor_name = reference.trim_start_matches('#').to_string();
        let (target_value, target_base, target_pointer) = ctx.resolve_reference(reference)?;
        let target_ctx = ctx.with_location(target_base, target_pointer);
        let static_target = crate::compiler::compile_schema(&target_ctx, arena, &target_value)?;
        validators.push(Box::new(DynamicRefValidator {
            anchor_name,
            static_target,
        }));
    }
    Ok(())
}

/// Static `$ref`: always follows the same compiled target.
struct RefValidator {
    target: NodeId,
}

impl Validate for RefValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let node = ctx.node(self.target);
        match ctx.enter_node(node) {
            Ok(inner) => node.apply(&inner, instance, instance_path),
            Err(()) => infinite_loop(node, instance, instance_path),
        }
    }
}

/// `$dynamicRef`: resolved against the *outermost* matching `$dynamicAnchor`
/// in the current evaluation's dynamic scope, falling back to the
/// statically-resolved target when nothing in scope matches (§4.H).
struct DynamicRefValidator {
    anchor_name: String,
    static_target: NodeId,
}

impl Validate for DynamicRefValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let target = ctx.lookup_dynamic_anchor(&self.anchor_name).unwrap_or(self.static_target);
        let node = ctx.node(target);
        match ctx.enter_node(node) {
            Ok(inner) => node.apply(&inner, instance, instance_path),
            Err(()) => infinite_loop(node, instance, instance_path),
        }
    }
}

fn infinite_loop<'i>(node: &crate::node::SchemaNode, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
    PartialApplication::Invalid {
        errors: vec![crate::error::ValidationError::new(
            ValidationErrorKind::InfiniteLoop,
            node.location.pointer.clone(),
            instance_path,
            instance,
        )],
        child_results: Vec::new(),
    }
}
