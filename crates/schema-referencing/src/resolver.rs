use serde_json::Value;

use crate::{error::Error, registry::Registry, resource::ResourceRef, uri, Draft};

/// A resolver bound to one point in the reference graph: a base URI plus the
/// stack of `$id`-bearing ancestor resources currently being evaluated (the
/// dynamic scope used by `$dynamicRef`).
#[derive(Debug, Clone)]
pub struct Resolver<'r> {
    registry: &'r Registry,
    base: String,
    /// Outermost-first stack of base URIs entered via `$id`.
    scopes: Vec<String>,
}

impl PartialEq for Resolver<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.scopes == other.scopes
    }
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(registry: &'r Registry, base: String) -> Self {
        Resolver {
            scopes: vec![base.clone()],
            registry,
            base,
        }
    }

    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base
    }

    /// Resolve `reference` (a `$ref`/`$dynamicRef` value, possibly relative)
    /// against the current base, following it to a concrete value.
    pub fn lookup(&self, reference: &str) -> Result<Resolved<'r>, Error> {
        let base = uri::from_str(&self.base)?;
        let resolved = uri::resolve_against(&base.borrow(), reference)?;
        let (base_part, fragment) = split_fragment(resolved.as_str());

        let resource = self.registry.resource(base_part)?;
        let child_resolver = Resolver {
            registry: self.registry,
            base: base_part.to_string(),
            scopes: vec![base_part.to_string()],
        };

        match fragment {
            "" => Ok(Resolved::new(resource.contents(), child_resolver, resource.draft())),
            f if f.starts_with('/') => resource.pointer(f, child_resolver),
            anchor => {
                let found = self.registry.anchor(base_part, anchor)?;
                Ok(Resolved::new(found, child_resolver, resource.draft()))
            }
        }
    }

    /// Resolve a `$dynamicRef` fragment against the dynamic scope: scan
    /// outermost to innermost for a matching `$dynamicAnchor`, falling back
    /// to static (lexical) resolution when none is found.
    pub fn lookup_dynamic(&self, anchor_name: &str) -> Result<Resolved<'r>, Error> {
        for base in &self.scopes {
            if let Ok(anchor) = self.registry.dynamic_anchor(base, anchor_name) {
                let resource = self.registry.resource(base)?;
                let child_resolver = Resolver {
                    registry: self.registry,
                    base: base.clone(),
                    scopes: vec![base.clone()],
                };
                return Ok(Resolved::new(anchor, child_resolver, resource.draft()));
            }
        }
        self.lookup(&format!("#{anchor_name}"))
    }

    /// Enter a subresource: push its resolved `$id` as a new innermost
    /// dynamic-scope frame.
    pub(crate) fn in_subresource(&self, resource: ResourceRef<'r>) -> Result<Resolver<'r>, Error> {
        let Some(id) = resource.id() else {
            return Ok(self.clone());
        };
        let base = uri::from_str(&self.base)?;
        let absolute = uri::resolve_against(&base.borrow(), id)?;
        let absolute = absolute.as_str().to_string();
        let mut scopes = self.scopes.clone();
        scopes.push(absolute.clone());
        Ok(Resolver {
            registry: self.registry,
            base: absolute,
            scopes,
        })
    }
}

fn split_fragment(uri: &str) -> (&str, &str) {
    match uri.split_once('#') {
        Some((base, fragment)) => (base, fragment),
        None => (uri, ""),
    }
}

/// The outcome of following a reference: the target value, a resolver
/// rooted at its containing resource, and that resource's dialect.
#[derive(Debug, Clone)]
pub struct Resolved<'r> {
    contents: &'r Value,
    resolver: Resolver<'r>,
    draft: Draft,
}

impl<'r> Resolved<'r> {
    pub(crate) fn new(contents: &'r Value, resolver: Resolver<'r>, draft: Draft) -> Self {
        Resolved {
            contents,
            resolver,
            draft,
        }
    }

    #[must_use]
    pub fn contents(&self) -> &'r Value {
        self.contents
    }

    #[must_use]
    pub fn resolver(&self) -> &Resolver<'r> {
        &self.resolver
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }
}
