//! Per-keyword validators (component I), one compile function per related
//! group of keywords. Each `compile` function inspects the schema object for
//! the keywords it owns and, if present, pushes a validator onto the shared
//! list built by [`crate::compiler::compile_keywords`].
pub mod applicators;
pub mod array;
pub mod content;
pub mod extra;
pub mod metadata;
pub mod numeric;
pub mod object;
pub mod reference;
pub mod string;
pub mod type_const;
pub mod unevaluated;

use serde_json::Value;

use crate::{
    compiler::Context,
    error::ValidationError,
    node::{Arena, NodeId},
    output::{Annotations, DetailNode, PartialApplication},
    paths::{JsonPointerNode, PathChunk},
};

/// Compile a subschema found under `keyword` into the arena, descending the
/// compiler context accordingly.
pub(crate) fn compile_subschema(
    ctx: &Context<'_>,
    arena: &mut Arena,
    keyword: &'static str,
    value: &Value,
) -> Result<NodeId, crate::error::CompileError> {
    let child_ctx = ctx.descend(keyword, value);
    crate::compiler::compile_schema(&child_ctx, arena, value)
}

pub(crate) fn compile_subschema_at(
    ctx: &Context<'_>,
    arena: &mut Arena,
    keyword: &'static str,
    index: usize,
    value: &Value,
) -> Result<NodeId, crate::error::CompileError> {
    let stage = ctx.descend(keyword, value);
    let child_ctx = stage.descend(PathChunk::Index(index), value);
    crate::compiler::compile_schema(&child_ctx, arena, value)
}

/// Compile a subschema reached through a string-keyed map keyword
/// (`properties`, `patternProperties`, `$defs`, `dependentSchemas`).
pub(crate) fn compile_subschema_named(
    ctx: &Context<'_>,
    arena: &mut Arena,
    keyword: &'static str,
    name: &str,
    value: &Value,
) -> Result<NodeId, crate::error::CompileError> {
    let stage = ctx.descend(keyword, value);
    let child_ctx = stage.descend(name.to_string(), value);
    crate::compiler::compile_schema(&child_ctx, arena, value)
}

/// Apply a compiled subschema at a given instance sub-path, returning the
/// [`PartialApplication`] already wrapped into a single-element
/// [`DetailNode`] list, ready to fold into a parent applicator's
/// `child_results`.
pub(crate) fn apply_child<'a, 'i>(
    arena: &'a Arena,
    id: NodeId,
    ctx: &crate::validator::EvalContext<'a>,
    instance: &'i Value,
    instance_path: &JsonPointerNode,
) -> (bool, Vec<ValidationError<'i>>, Annotations, Vec<DetailNode<'i>>) {
    let node = arena.get(id);
    let application = match ctx.enter_node(node) {
        Ok(inner) => node.apply(&inner, instance, instance_path),
        Err(()) => PartialApplication::Invalid {
            errors: vec![ValidationError::new(
                crate::error::ValidationErrorKind::InfiniteLoop,
                node.location.pointer.clone(),
                instance_path,
                instance,
            )],
            child_results: Vec::new(),
        },
    };
    match application {
        PartialApplication::Valid { annotations, child_results } => {
            let detail = DetailNode {
                evaluation_path: node.location.pointer.clone(),
                instance_location: instance_path.into(),
                schema_location: node.location.clone(),
                errors: Vec::new(),
                annotations: annotations.clone(),
                children: child_results,
            };
            (true, Vec::new(), annotations, vec![detail])
        }
        PartialApplication::Invalid { errors, child_results } => {
            let detail = DetailNode {
                evaluation_path: node.location.pointer.clone(),
                instance_location: instance_path.into(),
                schema_location: node.location.clone(),
                errors: errors.clone(),
                annotations: Annotations::new(),
                children: child_results,
            };
            (false, errors, Annotations::new(), vec![detail])
        }
    }
}
