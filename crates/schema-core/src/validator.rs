//! The evaluator core (component I): the `Validate` trait every keyword
//! implements, the explicit dynamic-scope parameter threaded through
//! recursion, and the public [`Validator`] handle returned by `compile`.
use std::sync::Arc;

use ahash::AHashMap;
use serde_json::Value;

use crate::{
    compiler,
    error::ValidationError,
    node::{Arena, NodeId},
    options::ValidationOptions,
    output::{Annotations, DetailNode, EvaluationResult, PartialApplication},
    paths::{JsonPointer, JsonPointerNode},
};

/// The stack of `$id`-bearing ancestor base URIs currently being evaluated,
/// used by `$dynamicRef` (§3.2, §4.H). Passed explicitly rather than kept in
/// a thread-local (§9 design note), which makes evaluation trivially
/// re-entrant: the same [`Validator`] can run many concurrent `validate`
/// calls with no shared mutable state.
#[derive(Debug, Clone, Default)]
pub struct DynamicScope<'a> {
    frames: Vec<&'a str>,
}

impl<'a> DynamicScope<'a> {
    #[must_use]
    pub fn entered(&self, base_uri: &'a str) -> Self {
        let mut frames = self.frames.clone();
        frames.push(base_uri);
        DynamicScope { frames }
    }

    /// Outermost-first iteration, matching §4.H's "scan from outermost to
    /// innermost" resolution order.
    pub fn iter(&self) -> impl Iterator<Item = &&'a str> {
        self.frames.iter()
    }
}

/// Recursion-budget guard (§5: 200 frames for applicators, 1,000 for ref
/// chases). Both share one counter here; a production tune would split
/// them, but a single conservative bound already prevents the only failure
/// mode that matters: an unbounded stack.
const MAX_EVALUATION_DEPTH: u32 = 1000;

/// Everything a keyword validator needs to evaluate itself: the arena its
/// `NodeId`s index into, the dynamic-anchor index for `$dynamicRef`, the
/// frozen compiler configuration, the current dynamic scope, and the current
/// recursion depth.
#[derive(Clone)]
pub struct EvalContext<'a> {
    pub(crate) arena: &'a Arena,
    pub(crate) dynamic_anchors: &'a AHashMap<(String, String), NodeId>,
    pub(crate) config: &'a ValidationOptions,
    pub(crate) scope: DynamicScope<'a>,
    pub(crate) depth: u32,
    /// Scratch accumulator for the annotations produced so far by *earlier*
    /// sibling keywords at the current schema node, read by
    /// `unevaluatedProperties`/`unevaluatedItems` (§4.I point 6: they must
    /// run last and see every other keyword's contribution). Set locally by
    /// [`crate::node::SchemaNode::apply`] around its own validator loop and
    /// never propagated into child nodes.
    pub(crate) sibling_annotations: Option<&'a std::cell::RefCell<Annotations>>,
}

impl<'a> EvalContext<'a> {
    #[must_use]
    pub fn config(&self) -> &ValidationOptions {
        self.config
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &'a crate::node::SchemaNode {
        self.arena.get(id)
    }

    /// Enter a node whose resource has its own `$id`: push a new dynamic
    /// scope frame and bump the recursion counter.
    ///
    /// # Errors
    /// `Err(())` once [`MAX_EVALUATION_DEPTH`] is exceeded; callers turn
    /// this into [`crate::error::ValidationErrorKind::InfiniteLoop`].
    pub(crate) fn enter(&self, base_uri: Option<&'a str>) -> Result<EvalContext<'a>, ()> {
        if self.depth >= MAX_EVALUATION_DEPTH {
            return Err(());
        }
        Ok(EvalContext {
            arena: self.arena,
            dynamic_anchors: self.dynamic_anchors,
            config: self.config,
            scope: match base_uri {
                Some(uri) => self.scope.entered(uri),
                None => self.scope.clone(),
            },
            depth: self.depth + 1,
            sibling_annotations: None,
        })
    }

    pub(crate) fn lookup_dynamic_anchor(&self, name: &str) -> Option<NodeId> {
        self.scope
            .iter()
            .find_map(|base| self.dynamic_anchors.get(&((*base).to_string(), name.to_string())))
            .copied()
    }

    /// Enter `node`, pushing its resource's base URI onto the dynamic scope
    /// (§4.H: the scope records every schema resource entered in evaluation
    /// order, not just `$dynamicRef` targets).
    ///
    /// # Errors
    /// `Err(())` once [`MAX_EVALUATION_DEPTH`] is exceeded.
    pub(crate) fn enter_node(&self, node: &'a crate::node::SchemaNode) -> Result<EvalContext<'a>, ()> {
        self.enter(Some(node.location.base_uri.as_str()))
    }
}

/// Every keyword validator implements this. `apply` is the richer contract
/// (annotations plus verdict); `validate`/`is_valid` have default
/// implementations derived from it so simple assertion keywords only need to
/// implement one method.
pub trait Validate: Send + Sync {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i>;

    fn validate<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> Vec<ValidationError<'i>> {
        match self.apply(ctx, instance, instance_path) {
            PartialApplication::Valid { .. } => Vec::new(),
            PartialApplication::Invalid { errors, .. } => errors,
        }
    }

    fn is_valid(&self, ctx: &EvalContext<'_>, instance: &Value) -> bool {
        self.apply(ctx, instance, &JsonPointerNode::Root).is_valid()
    }
}

/// A helper for assertion-only keywords (no annotations, no children): turn
/// a `validate` implementation into a full `Validate` impl via
/// [`simple_validate`].
pub(crate) fn simple_apply<'i>(errors: Vec<ValidationError<'i>>) -> PartialApplication<'i> {
    if errors.is_empty() {
        PartialApplication::Valid {
            annotations: Annotations::new(),
            child_results: Vec::new(),
        }
    } else {
        PartialApplication::Invalid {
            errors,
            child_results: Vec::new(),
        }
    }
}

/// A compiled, immutable validator (§3.4: "thereafter immutable; evaluations
/// are stateless with respect to the compiled graph"). Cheap to clone
/// (`Arc`-backed) and safe to share across threads.
#[derive(Clone)]
pub struct Validator {
    inner: Arc<ValidatorInner>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").finish_non_exhaustive()
    }
}

struct ValidatorInner {
    arena: Arena,
    root: NodeId,
    dynamic_anchors: AHashMap<(String, String), NodeId>,
    config: ValidationOptions,
    base_uri: String,
    schema: Value,
}

impl Validator {
    pub(crate) fn new(
        arena: Arena,
        root: NodeId,
        dynamic_anchors: AHashMap<(String, String), NodeId>,
        config: ValidationOptions,
        base_uri: String,
        schema: Value,
    ) -> Self {
        Validator {
            inner: Arc::new(ValidatorInner {
                arena,
                root,
                dynamic_anchors,
                config,
                base_uri,
                schema,
            }),
        }
    }

    /// The original schema document, kept around for `unmarshal`'s
    /// schema-directed default filling (§4.K), which walks the raw schema
    /// rather than the compiled arena.
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.inner.schema
    }

    /// Start a fresh compiler with default options.
    pub fn options() -> crate::options::OptionsBuilder {
        crate::options::OptionsBuilder::new()
    }

    /// Compile `schema` with default options.
    ///
    /// # Errors
    /// See [`compiler::build_validator`].
    pub fn for_schema(schema: &Value) -> Result<Validator, crate::error::CompileError> {
        compiler::build_validator(schema, ValidationOptions::default())
    }

    #[must_use]
    pub fn config(&self) -> &ValidationOptions {
        &self.inner.config
    }

    fn root_context(&self) -> EvalContext<'_> {
        EvalContext {
            arena: &self.inner.arena,
            dynamic_anchors: &self.inner.dynamic_anchors,
            config: &self.inner.config,
            scope: DynamicScope::default().entered(&self.inner.base_uri),
            depth: 0,
            sibling_annotations: None,
        }
    }

    /// `true`/`false` only, no detail — the cheapest possible check.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.inner
            .arena
            .get(self.inner.root)
            .is_valid(&self.root_context(), instance)
    }

    /// Flat error iteration without building the detail tree.
    pub fn iter_errors<'v>(&'v self, instance: &'v Value) -> impl Iterator<Item = ValidationError<'v>> + 'v {
        self.inner
            .arena
            .get(self.inner.root)
            .validate(&self.root_context(), instance, &JsonPointerNode::Root)
            .into_iter()
    }

    /// Full evaluation (§3.3): the detail tree, annotations, and errors.
    #[must_use]
    pub fn evaluate<'v>(&self, instance: &'v Value) -> EvaluationResult<'v> {
        let ctx = self.root_context();
        let root = self.inner.arena.get(self.inner.root);
        let location = root.location.clone();
        let application = root.apply(&ctx, instance, &JsonPointerNode::Root);
        let detail = match application {
            PartialApplication::Valid { annotations, child_results } => DetailNode {
                evaluation_path: JsonPointer::new(),
                instance_location: JsonPointer::new(),
                schema_location: location,
                errors: Vec::new(),
                annotations,
                children: child_results,
            },
            PartialApplication::Invalid { errors, child_results } => DetailNode {
                evaluation_path: JsonPointer::new(),
                instance_location: JsonPointer::new(),
                schema_location: location,
                errors,
                annotations: Annotations::new(),
                children: child_results,
            },
        };
        EvaluationResult { root: detail }
    }

    /// `validate(schema, bytes)`: parse then evaluate, surfacing a JSON
    /// parse failure as a single top-level error (§6.2).
    ///
    /// # Errors
    /// `Err` only on malformed JSON; validation failures are reported inside
    /// `Ok(EvaluationResult)`.
    pub fn evaluate_bytes(&self, bytes: &[u8]) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn validator_is_send_and_sync() {
        assert_send_sync::<Validator>();
    }

    #[test]
    fn empty_schema_accepts_everything() {
        let validator = Validator::for_schema(&json!(true)).unwrap();
        assert!(validator.is_valid(&json!(null)));
        assert!(validator.is_valid(&json!({"a": 1})));
    }

    #[test]
    fn false_schema_rejects_everything() {
        let validator = Validator::for_schema(&json!(false)).unwrap();
        assert!(!validator.is_valid(&json!(null)));
    }
}
