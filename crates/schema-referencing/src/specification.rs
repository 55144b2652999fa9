use serde_json::{Map, Value};

use crate::{
    anchors::Anchor,
    error::Error,
    resolver::Resolver,
    resource::{Resource, ResourceRef},
    segments::Segments,
};

/// The JSON Schema dialect a resource is interpreted under.
///
/// This engine targets exactly one dialect. The type remains an enum (rather
/// than a unit struct) because `$schema` detection and resource construction
/// are still meaningful operations to name, and because a single-variant enum
/// keeps every call site that matches on dialect honest about the fact that
/// there is, deliberately, only one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Draft {
    #[default]
    Draft202012,
}

const DIALECT_202012: &str = "https://json-schema.org/draft/2020-12/schema";

impl Draft {
    /// Detect the dialect from a `$schema` value, defaulting to 2020-12 when
    /// absent. An explicit `$schema` naming a different dialect is rejected:
    /// this engine has nothing else to offer it.
    pub(crate) fn detect(self, contents: &Value) -> Result<Draft, Error> {
        match contents.get("$schema").and_then(Value::as_str) {
            None => Ok(Draft::Draft202012),
            Some(schema) if schema.trim_end_matches('#') == DIALECT_202012 => {
                Ok(Draft::Draft202012)
            }
            Some(other) => Err(Error::UnknownSpecification {
                schema: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub(crate) fn create_resource(self, contents: Value) -> Resource {
        Resource::new(contents, self)
    }

    #[must_use]
    pub(crate) fn create_resource_ref(self, contents: &Value) -> ResourceRef<'_> {
        ResourceRef::new(contents, self)
    }

    #[must_use]
    pub(crate) fn id_of(self, contents: &Value) -> Option<&str> {
        contents.as_object()?.get("$id")?.as_str()
    }

    /// All `$anchor`/`$dynamicAnchor` entries declared directly on this
    /// resource (not recursing into subresources â€” the registry walks those
    /// separately).
    pub(crate) fn anchors(self, contents: &Value) -> impl Iterator<Item = Anchor> + '_ {
        let object = contents.as_object();
        let plain = object
            .and_then(|obj| obj.get("$anchor"))
            .and_then(Value::as_str)
            .map(|name| Anchor::new(name, contents.clone(), false));
        let dynamic = object
            .and_then(|obj| obj.get("$dynamicAnchor"))
            .and_then(Value::as_str)
            .map(|name| Anchor::new(name, contents.clone(), true));
        plain.into_iter().chain(dynamic)
    }

    /// Direct subresources: values that are themselves schemas under a
    /// different `$id`-able boundary. `$defs`/`properties`/etc. are *not*
    /// subresources unless they introduce a new `$id`; the registry's BFS
    /// recurses through every schema-valued location regardless, and lets
    /// `$id` presence decide where the resource boundary actually falls
    /// (see [`Self::maybe_in_subresource`]).
    pub(crate) fn subresources_of(self, contents: &Value) -> Box<dyn Iterator<Item = Value> + '_> {
        let Some(object) = contents.as_object() else {
            return Box::new(std::iter::empty());
        };
        Box::new(SubresourceIter::new(object))
    }

    /// If `contents` at `segments` carries its own `$id`, enter a fresh
    /// dynamic-scope frame rooted there; otherwise remain in `resolver`'s
    /// current frame.
    pub(crate) fn maybe_in_subresource<'r>(
        self,
        segments: &Segments,
        resolver: &Resolver<'r>,
        contents: ResourceRef<'r>,
    ) -> Result<Resolver<'r>, Error> {
        if segments.is_empty() {
            return Ok(resolver.clone());
        }
        if contents.id().is_some() {
            resolver.in_subresource(contents)
        } else {
            Ok(resolver.clone())
        }
    }
}

/// Depth-first walk over every value position in a schema object that may
/// itself hold a schema (object or array of schemas), per the 2020-12 core
/// and applicator vocabularies.
struct SubresourceIter<'a> {
    stack: Vec<Value>,
    _marker: std::marker::PhantomData<&'a ()>,
}

impl<'a> SubresourceIter<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        let mut stack = Vec::new();
        const SINGLE_SCHEMA_KEYWORDS: &[&str] = &[
            "additionalProperties",
            "unevaluatedProperties",
            "unevaluatedItems",
            "propertyNames",
            "contains",
            "items",
            "not",
            "if",
            "then",
            "else",
        ];
        const SCHEMA_MAP_KEYWORDS: &[&str] =
            &["properties", "patternProperties", "$defs", "dependentSchemas"];
        const SCHEMA_ARRAY_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];

        for key in SINGLE_SCHEMA_KEYWORDS {
            if let Some(value) = object.get(*key) {
                stack.push(value.clone());
            }
        }
        for key in SCHEMA_MAP_KEYWORDS {
            if let Some(Value::Object(map)) = object.get(*key) {
                stack.extend(map.values().cloned());
            }
        }
        for key in SCHEMA_ARRAY_KEYWORDS {
            if let Some(Value::Array(items)) = object.get(*key) {
                stack.extend(items.iter().cloned());
            }
        }
        SubresourceIter {
            stack,
            _marker: std::marker::PhantomData,
        }
    }
}

impl Iterator for SubresourceIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.stack.pop()
    }
}
