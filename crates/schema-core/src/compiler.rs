//! The compiler (component G): parses a schema document, normalizes
//! keywords into typed validators, and resolves the reference graph.
use std::cell::RefCell;

use ahash::AHashMap;
use once_cell::sync::Lazy;
use schema_referencing::{Registry, RegistryOptions, Resource};
use serde_json::{json, Value};

use crate::{
    error::{CompileError, CompileErrorKind},
    keywords,
    node::{Arena, NodeId, SchemaNode},
    options::ValidationOptions,
    paths::{JsonPointer, Location, PathChunk},
    validator::{Validate, Validator},
};

const DEFAULT_BASE_URI: &str = "json-schema:///";

struct CompileState {
    registry: Registry,
    /// Memoizes `location key -> NodeId` so a `$ref` back to an ancestor (or
    /// a repeated target) reuses the in-progress node instead of recursing
    /// forever (component E / §9 "references are indices, not owning
    /// pointers").
    seen: RefCell<AHashMap<String, NodeId>>,
    dynamic_anchors: RefCell<AHashMap<(String, String), NodeId>>,
}

/// Compile-time context threaded through recursive descent: current base
/// URI, current pointer into the schema document, and a handle to the
/// shared, mutable compile-wide state (the reference registry and the
/// node memo).
pub struct Context<'a> {
    state: &'a CompileState,
    pub(crate) config: &'a ValidationOptions,
    pub(crate) base_uri: String,
    pub(crate) pointer: JsonPointer,
}

impl<'a> Context<'a> {
    #[must_use]
    pub fn config(&self) -> &ValidationOptions {
        self.config
    }

    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// The absolute schema location this context currently points at.
    #[must_use]
    pub fn location(&self) -> Location {
        Location {
            base_uri: self.base_uri.clone(),
            pointer: self.pointer.clone(),
        }
    }

    /// A new context for a subschema found under `keyword` (and, for
    /// array-valued keywords, `index`), with the base URI updated if the
    /// subschema carries its own `$id`.
    pub(crate) fn descend(&self, chunk: impl Into<PathChunk>, subschema: &Value) -> Context<'a> {
        let pointer = self.pointer.push(chunk);
        let base_uri = subschema
            .get("$id")
            .and_then(Value::as_str)
            .map(|id| resolve_relative(&self.base_uri, id))
            .unwrap_or_else(|| self.base_uri.clone());
        Context {
            state: self.state,
            config: self.config,
            base_uri,
            pointer,
        }
    }

    fn location_key(&self) -> String {
        format!("{}#{}", self.base_uri, self.pointer)
    }

    /// A context pointed at an explicit `(base_uri, pointer)`, for following
    /// a resolved `$ref`/`$dynamicRef` target rather than descending into a
    /// literal child of the current schema.
    pub(crate) fn with_location(&self, base_uri: String, pointer: JsonPointer) -> Context<'a> {
        Context {
            state: self.state,
            config: self.config,
            base_uri,
            pointer,
        }
    }

    /// Resolve a `$ref`/`$dynamicRef` URI reference against the current
    /// base, returning the target value, the base URI it lives under, and
    /// its pointer within that resource's document.
    pub(crate) fn resolve_reference(&self, reference: &str) -> Result<(Value, String, JsonPointer), CompileError> {
        let resolver = self
            .state
            .registry
            .try_resolver(&self.base_uri)
            .map_err(|source| {
                CompileError::new(CompileErrorKind::UnresolvableRef {
                    reference: reference.to_string(),
                    source,
                })
            })?;
        let resolved = resolver.lookup(reference).map_err(|source| {
            CompileError::new(CompileErrorKind::UnresolvableRef {
                reference: reference.to_string(),
                source,
            })
        })?;
        let pointer = pointer_from_fragment(reference);
        Ok((resolved.contents().clone(), resolved.resolver().base_uri().to_string(), pointer))
    }

    pub(crate) fn register_dynamic_anchor(&self, name: &str, id: NodeId) {
        self.state
            .dynamic_anchors
            .borrow_mut()
            .insert((self.base_uri.clone(), name.to_string()), id);
    }
}

fn pointer_from_fragment(reference: &str) -> JsonPointer {
    let fragment = reference.split_once('#').map_or("", |(_, f)| f);
    if let Some(path) = fragment.strip_prefix('/') {
        let mut pointer = JsonPointer::new();
        for segment in path.split('/') {
            let decoded = segment.replace("~1", "/").replace("~0", "~");
            pointer = pointer.push(decoded);
        }
        pointer
    } else {
        JsonPointer::new()
    }
}

fn resolve_relative(base: &str, reference: &str) -> String {
    url::Url::parse(base)
        .and_then(|b| b.join(reference))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| reference.to_string())
}

/// Compile a schema document into a [`Validator`] (§4.G, §6.2 `compile`).
///
/// # Errors
/// [`CompileError`] per §7's `CompileError` taxonomy; the compiler is
/// all-or-nothing.
pub fn build_validator(schema: &Value, config: ValidationOptions) -> Result<Validator, CompileError> {
    let base_uri = schema
        .get("$id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_BASE_URI.to_string());

    let resource = Resource::from_contents(schema.clone()).map_err(|source| {
        CompileError::new(CompileErrorKind::UnresolvableRef {
            reference: base_uri.clone(),
            source,
        })
    })?;

    // Extra meta-schemas (§6.3 `metaSchemas`) are registered alongside the
    // document under compilation so that a `$schema`/`$ref` pointing at one
    // resolves instead of erroring as an unknown resource. A document with
    // its own `$id` is keyed by that `$id`; one without gets a synthetic,
    // index-derived URI so registration stays deterministic.
    let mut roots = vec![(base_uri.clone(), resource)];
    for (index, meta_schema) in config.extra_meta_schemas.iter().enumerate() {
        let meta_uri = meta_schema
            .get("$id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{DEFAULT_BASE_URI}extra-meta-schema-{index}"));
        let meta_resource = Resource::from_contents(meta_schema.clone()).map_err(|source| {
            CompileError::new(CompileErrorKind::UnresolvableRef {
                reference: meta_uri.clone(),
                source,
            })
        })?;
        roots.push((meta_uri, meta_resource));
    }

    let registry = Registry::try_from_resources(roots, RegistryOptions::new()).map_err(|source| {
        CompileError::new(CompileErrorKind::UnresolvableRef {
            reference: base_uri.clone(),
            source,
        })
    })?;

    let state = CompileState {
        registry,
        seen: RefCell::new(AHashMap::new()),
        dynamic_anchors: RefCell::new(AHashMap::new()),
    };
    let ctx = Context {
        state: &state,
        config: &config,
        base_uri: base_uri.clone(),
        pointer: JsonPointer::new(),
    };

    let mut arena = Arena::new();
    let root = compile_schema(&ctx, &mut arena, schema)?;
    let dynamic_anchors = state.dynamic_anchors.into_inner();

    Ok(Validator::new(arena, root, dynamic_anchors, config, base_uri, schema.clone()))
}

/// Compile one schema value (boolean or object) into the arena, returning
/// its [`NodeId`]. Cycle-safe: the location is memoized before recursing
/// into subschemas so a reference back to an in-progress ancestor resolves
/// to the same node instead of looping.
pub(crate) fn compile_schema(ctx: &Context<'_>, arena: &mut Arena, value: &Value) -> Result<NodeId, CompileError> {
    let key = ctx.location_key();
    if let Some(id) = ctx.state.seen.borrow().get(&key) {
        return Ok(*id);
    }

    let id = arena.reserve();
    ctx.state.seen.borrow_mut().insert(key, id);

    let node = match value {
        Value::Bool(b) => SchemaNode::from_boolean(ctx.location(), *b),
        Value::Object(object) => {
            for (name, contents) in object {
                if name == "$dynamicAnchor" {
                    if let Some(anchor_name) = contents.as_str() {
                        ctx.register_dynamic_anchor(anchor_name, id);
                    }
                }
            }
            let validators = compile_keywords(ctx, arena, object)?;
            SchemaNode::from_keywords(ctx.location(), validators)
        }
        other => {
            return Err(CompileError::new(CompileErrorKind::InvalidKeyword {
                keyword: "<schema>",
                value: other.clone(),
            })
            .at(ctx.location()))
        }
    };
    arena.fill(id, node);
    Ok(id)
}

/// Compile every recognized keyword of one schema object, in the evaluation
/// order of §4.I (annotation interactions only; error correctness does not
/// depend on this order).
fn compile_keywords(
    ctx: &Context<'_>,
    arena: &mut Arena,
    object: &serde_json::Map<String, Value>,
) -> Result<Vec<Box<dyn Validate>>, CompileError> {
    let mut validators: Vec<Box<dyn Validate>> = Vec::new();

    keywords::reference::compile(ctx, arena, object, &mut validators)?;
    keywords::type_const::compile(ctx, object, &mut validators)?;
    keywords::numeric::compile(ctx, object, &mut validators)?;
    keywords::string::compile(ctx, object, &mut validators)?;
    keywords::array::compile(ctx, arena, object, &mut validators)?;
    keywords::object::compile(ctx, arena, object, &mut validators)?;
    keywords::applicators::compile(ctx, arena, object, &mut validators)?;
    keywords::content::compile(ctx, object, &mut validators)?;
    keywords::metadata::compile(ctx, object, &mut validators)?;
    keywords::extra::compile(ctx, object, &mut validators)?;
    // unevaluated* must run last: it consumes annotations from every
    // sibling/applicator above it (§4.I point 6).
    keywords::unevaluated::compile(ctx, arena, object, &mut validators)?;

    for (name, factory) in &ctx.config.custom_keywords {
        if let Some(value) = object.get(name) {
            validators.push(factory(value, ctx)?);
        }
    }

    Ok(validators)
}

/// A flattened Draft 2020-12 meta-schema, covering every keyword this crate
/// compiles. The official meta-schema is composed from several
/// `$dynamicRef`-linked vocabulary documents (core, applicator, validation,
/// …); this single self-contained document expresses the same keyword
/// shapes without that composition, per the single-dialect simplification
/// this crate targets. Subschema-valued keywords recurse via a plain `$ref`
/// back to the document root, so nested schemas are checked by the same
/// rules as the top level.
static META_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://json-schema.org/draft/2020-12/schema",
        "type": ["object", "boolean"],
        "properties": {
            "$id": {"type": "string"},
            "$schema": {"type": "string"},
            "$ref": {"type": "string"},
            "$dynamicRef": {"type": "string"},
            "$dynamicAnchor": {"type": "string"},
            "$anchor": {"type": "string"},
            "$comment": {"type": "string"},
            "$defs": {"type": "object", "additionalProperties": {"$ref": "#"}},
            "title": {"type": "string"},
            "description": {"type": "string"},
            "default": true,
            "examples": {"type": "array"},
            "deprecated": {"type": "boolean"},
            "readOnly": {"type": "boolean"},
            "writeOnly": {"type": "boolean"},
            "type": {
                "anyOf": [
                    {"$ref": "#/$defs/simpleTypes"},
                    {"type": "array", "items": {"$ref": "#/$defs/simpleTypes"}, "minItems": 1, "uniqueItems": true}
                ]
            },
            "enum": {"type": "array", "minItems": 1},
            "const": true,
            "multipleOf": {"type": "number", "exclusiveMinimum": 0},
            "maximum": {"type": "number"},
            "exclusiveMaximum": {"type": "number"},
            "minimum": {"type": "number"},
            "exclusiveMinimum": {"type": "number"},
            "maxLength": {"$ref": "#/$defs/nonNegativeInteger"},
            "minLength": {"$ref": "#/$defs/nonNegativeInteger"},
            "pattern": {"type": "string", "format": "regex"},
            "prefixItems": {"$ref": "#/$defs/schemaArray"},
            "items": {"$ref": "#"},
            "contains": {"$ref": "#"},
            "minContains": {"$ref": "#/$defs/nonNegativeInteger"},
            "maxContains": {"$ref": "#/$defs/nonNegativeInteger"},
            "maxItems": {"$ref": "#/$defs/nonNegativeInteger"},
            "minItems": {"$ref": "#/$defs/nonNegativeInteger"},
            "uniqueItems": {"type": "boolean"},
            "maxProperties": {"$ref": "#/$defs/nonNegativeInteger"},
            "minProperties": {"$ref": "#/$defs/nonNegativeInteger"},
            "required": {"$ref": "#/$defs/stringArray"},
            "dependentRequired": {"type": "object", "additionalProperties": {"$ref": "#/$defs/stringArray"}},
            "properties": {"type": "object", "additionalProperties": {"$ref": "#"}},
            "patternProperties": {"type": "object", "additionalProperties": {"$ref": "#"}},
            "additionalProperties": {"$ref": "#"},
            "propertyNames": {"$ref": "#"},
            "allOf": {"$ref": "#/$defs/schemaArray"},
            "anyOf": {"$ref": "#/$defs/schemaArray"},
            "oneOf": {"$ref": "#/$defs/schemaArray"},
            "not": {"$ref": "#"},
            "if": {"$ref": "#"},
            "then": {"$ref": "#"},
            "else": {"$ref": "#"},
            "dependentSchemas": {"type": "object", "additionalProperties": {"$ref": "#"}},
            "unevaluatedItems": {"$ref": "#"},
            "unevaluatedProperties": {"$ref": "#"},
            "format": {"type": "string"},
            "contentEncoding": {"type": "string"},
            "contentMediaType": {"type": "string"},
            "contentSchema": {"$ref": "#"}
        },
        "$defs": {
            "simpleTypes": {
                "enum": ["array", "boolean", "integer", "null", "number", "object", "string"]
            },
            "nonNegativeInteger": {"type": "integer", "minimum": 0},
            "stringArray": {"type": "array", "items": {"type": "string"}, "uniqueItems": true},
            "schemaArray": {"type": "array", "minItems": 1, "items": {"$ref": "#"}}
        }
    })
});

static META_SCHEMA_VALIDATOR: Lazy<Validator> =
    Lazy::new(|| build_validator(&META_SCHEMA, ValidationOptions::default()).expect("embedded meta-schema must compile"));

/// Entry point for operations that don't need a full compiled [`Validator`]
/// (§2's "always-available operation").
pub struct Compiler;

impl Compiler {
    /// Check `schema` against the 2020-12 meta-schema without compiling it
    /// (§8.1 "meta-schema compliance"), grounded in the teacher's
    /// `META_SCHEMA_VALIDATORS` map, simplified to the single dialect this
    /// crate targets.
    ///
    /// # Errors
    /// [`CompileErrorKind::MetaSchemaMismatch`] listing every violation found.
    pub fn check_meta_schema(schema: &Value) -> Result<(), CompileError> {
        let result = META_SCHEMA_VALIDATOR.evaluate(schema);
        if result.is_valid() {
            Ok(())
        } else {
            Err(CompileError::new(CompileErrorKind::MetaSchemaMismatch {
                errors: result.errors().into_iter().map(ToString::to_string).collect(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_schema_validates_against_itself() {
        Compiler::check_meta_schema(&META_SCHEMA).expect("the meta-schema must be valid per itself");
    }

    #[test]
    fn accepts_a_well_formed_schema() {
        Compiler::check_meta_schema(&json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        }))
        .unwrap();
    }

    #[test]
    fn accepts_boolean_schemas() {
        Compiler::check_meta_schema(&json!(true)).unwrap();
        Compiler::check_meta_schema(&json!(false)).unwrap();
    }

    #[test]
    fn rejects_a_keyword_with_the_wrong_shape() {
        let err = Compiler::check_meta_schema(&json!({"type": 5})).unwrap_err();
        assert!(matches!(err.kind, CompileErrorKind::MetaSchemaMismatch { .. }));
    }
}
