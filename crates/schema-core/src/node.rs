//! The compiled schema representation (component E / §3.1).
//!
//! Per §9's design note, recursive schemas become a cyclic *graph*, not a
//! cyclic ownership structure: every [`SchemaNode`] lives in an [`Arena`] and
//! is addressed by [`NodeId`] everywhere except from its immediate parent.
//! Only `$ref`/`$dynamicRef` ever need to point at a node compiled
//! elsewhere (possibly an ancestor, possibly not yet finished compiling);
//! every other keyword owns its subschemas directly, since `properties`,
//! `allOf`, `items` and friends are never themselves cyclic.
use serde_json::Value;

use crate::{
    output::PartialApplication,
    paths::{JsonPointer, JsonPointerNode, Location},
    validator::{EvalContext, Validate},
};

/// An index into an [`Arena`]. Stable for the lifetime of the arena it was
/// issued from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Owns every compiled [`SchemaNode`] reachable from one `compile` call
/// (including nodes only reachable through `$ref`). Frozen once `compile`
/// returns (§5).
#[derive(Default)]
pub struct Arena {
    nodes: Vec<Option<SchemaNode>>,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Arena { nodes: Vec::new() }
    }

    /// Reserve a slot before the node it will hold is fully compiled, so a
    /// `$ref` encountered while compiling a schema can point at its own
    /// still-in-progress ancestor.
    pub(crate) fn reserve(&mut self) -> NodeId {
        self.nodes.push(None);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn fill(&mut self, id: NodeId, node: SchemaNode) {
        self.nodes[id.0] = Some(node);
    }

    pub(crate) fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = self.reserve();
        self.fill(id, node);
        id
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> &SchemaNode {
        self.nodes[id.0]
            .as_ref()
            .expect("every reserved node is filled before evaluation begins")
    }
}

/// A compiled schema node: the boolean schemas `true`/`false`, or an object
/// schema compiled into an ordered list of keyword validators.
pub struct SchemaNode {
    pub location: Location,
    pub(crate) validators: NodeValidators,
}

pub(crate) enum NodeValidators {
    /// `true` accepts everything, `false` rejects everything.
    Boolean(bool),
    /// Keyword validators in the evaluation order of §4.I.
    Keywords(Vec<Box<dyn Validate>>),
}

impl SchemaNode {
    #[must_use]
    pub(crate) fn from_boolean(location: Location, value: bool) -> Self {
        SchemaNode {
            location,
            validators: NodeValidators::Boolean(value),
        }
    }

    #[must_use]
    pub(crate) fn from_keywords(location: Location, validators: Vec<Box<dyn Validate>>) -> Self {
        SchemaNode {
            location,
            validators: NodeValidators::Keywords(validators),
        }
    }

    /// Evaluate every keyword validator against `instance`, collecting all
    /// errors (§4.I's short-circuit policy: siblings never suppress each
    /// other's errors). Delegates to [`SchemaNode::apply`] so
    /// `unevaluatedProperties`/`unevaluatedItems` see the same sibling
    /// annotations they would during a full evaluation.
    pub fn validate<'i>(
        &self,
        ctx: &EvalContext<'_>,
        instance: &'i Value,
        instance_path: &JsonPointerNode,
    ) -> Vec<crate::error::ValidationError<'i>> {
        match self.apply(ctx, instance, instance_path) {
            PartialApplication::Valid { .. } => Vec::new(),
            PartialApplication::Invalid { errors, .. } => errors,
        }
    }

    #[must_use]
    pub fn is_valid(&self, ctx: &EvalContext<'_>, instance: &Value) -> bool {
        self.apply(ctx, instance, &JsonPointerNode::Root).is_valid()
    }

    /// Evaluate this node and build the detail subtree plus the merged
    /// annotations a parent applicator should fold in (only when this node
    /// is itself valid, per the annotation merge rule of §4.I).
    pub fn apply<'i>(
        &self,
        ctx: &EvalContext<'_>,
        instance: &'i Value,
        instance_path: &JsonPointerNode,
    ) -> PartialApplication<'i> {
        match &self.validators {
            NodeValidators::Boolean(true) => PartialApplication::Valid {
                annotations: crate::output::Annotations::new(),
                child_results: Vec::new(),
            },
            NodeValidators::Boolean(false) => PartialApplication::Invalid {
                errors: vec![crate::error::ValidationError::new(
                    crate::error::ValidationErrorKind::Custom {
                        message: "false schema never validates".to_string(),
                    },
                    self.location.pointer.clone(),
                    instance_path,
                    instance,
                )],
                child_results: Vec::new(),
            },
            NodeValidators::Keywords(validators) => {
                let scratch = std::cell::RefCell::new(crate::output::Annotations::new());
                let mut errors = Vec::new();
                let mut annotations = crate::output::Annotations::new();
                let mut children = Vec::new();
                for validator in validators {
                    let scoped_ctx = EvalContext {
                        sibling_annotations: Some(&scratch),
                        ..ctx.clone()
                    };
                    match validator.apply(&scoped_ctx, instance, instance_path) {
                        PartialApplication::Valid {
                            annotations: a,
                            child_results,
                        } => {
                            scratch.borrow_mut().merge(a.clone());
                            annotations.merge(a);
                            children.extend(child_results);
                        }
                        PartialApplication::Invalid {
                            errors: e,
                            child_results,
                        } => {
                            errors.extend(e);
                            children.extend(child_results);
                        }
                    }
                }
                if errors.is_empty() {
                    PartialApplication::Valid {
                        annotations,
                        child_results: children,
                    }
                } else {
                    PartialApplication::Invalid {
                        errors,
                        child_results: children,
                    }
                }
            }
        }
    }

    #[must_use]
    pub(crate) fn schema_path(&self, suffix: impl Into<crate::paths::PathChunk>) -> JsonPointer {
        self.location.pointer.push(suffix)
    }
}
