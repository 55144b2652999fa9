use std::collections::VecDeque;

use ahash::AHashMap;
use serde_json::Value;

use crate::{
    anchors::Anchor,
    error::Error,
    resolver::Resolver,
    resource::Resource,
    retriever::{DefaultRetriever, Retrieve},
    uri, Draft,
};

/// Knobs for building a [`Registry`].
pub struct RegistryOptions {
    retriever: Box<dyn Retrieve>,
    draft: Draft,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        RegistryOptions {
            retriever: Box::new(DefaultRetriever),
            draft: Draft::default(),
        }
    }
}

impl RegistryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn retriever(mut self, retriever: impl Retrieve + 'static) -> Self {
        self.retriever = Box::new(retriever);
        self
    }

    #[must_use]
    pub fn draft(mut self, draft: Draft) -> Self {
        self.draft = draft;
        self
    }
}

/// An index of resources reachable from a set of root documents, built by
/// eagerly walking every `$ref`/subresource/anchor at compile time (not
/// lazily during evaluation) so that validation never performs I/O.
#[derive(Debug)]
pub struct Registry {
    resources: AHashMap<String, Resource>,
    anchors: AHashMap<(String, String), Anchor>,
}

impl Registry {
    /// Build a registry rooted at a single `(base_uri, resource)` pair, with
    /// default options (no remote fetching).
    pub fn try_new(base_uri: impl Into<String>, resource: Resource) -> Result<Registry, Error> {
        Self::try_from_resources(std::iter::once((base_uri.into(), resource)), RegistryOptions::default())
    }

    /// Build a registry from several root documents sharing one index,
    /// supporting `compileBatch`'s all-or-nothing semantics: any resolution
    /// failure anywhere aborts the whole build.
    pub fn try_from_resources(
        roots: impl IntoIterator<Item = (String, Resource)>,
        options: RegistryOptions,
    ) -> Result<Registry, Error> {
        let mut registry = Registry {
            resources: AHashMap::new(),
            anchors: AHashMap::new(),
        };
        let mut queue: VecDeque<(String, Resource)> = roots.into_iter().collect();
        let mut pending_external: Vec<String> = Vec::new();

        loop {
            while let Some((base, resource)) = queue.pop_front() {
                registry.process_resource(&base, resource, &mut queue, &mut pending_external)?;
            }
            if pending_external.is_empty() {
                break;
            }
            let mut fetched_any = false;
            for uri in std::mem::take(&mut pending_external) {
                if registry.resources.contains_key(&uri) {
                    continue;
                }
                let contents = options
                    .retriever
                    .retrieve(&uri)
                    .map_err(|source| Error::Unretrievable {
                        uri: uri.clone(),
                        source,
                    })?;
                let resource = Resource::from_contents_and_draft(contents, options.draft)?;
                queue.push_back((uri, resource));
                fetched_any = true;
            }
            if !fetched_any {
                break;
            }
        }
        Ok(registry)
    }

    fn process_resource(
        &mut self,
        base: &str,
        resource: Resource,
        queue: &mut VecDeque<(String, Resource)>,
        pending_external: &mut Vec<String>,
    ) -> Result<(), Error> {
        let base = match resource.id() {
            Some(id) => {
                let resolved = uri::resolve_against(&uri::from_str(base)?.borrow(), id)?;
                resolved.as_str().to_string()
            }
            None => base.to_string(),
        };

        if self.resources.contains_key(&base) {
            return Ok(());
        }

        for anchor in resource.anchors() {
            self.anchors
                .insert((base.clone(), anchor.name().to_string()), anchor);
        }

        for external in collect_external_references(resource.contents(), &base)? {
            if !self.resources.contains_key(&external) {
                pending_external.push(external);
            }
        }

        for subresource in resource.subresources() {
            queue.push_back((base.clone(), subresource?));
        }

        self.resources.insert(base, resource);
        Ok(())
    }

    pub(crate) fn resource(&self, base: &str) -> Result<&Resource, Error> {
        self.resources
            .get(base)
            .ok_or_else(|| Error::NoSuchResource { uri: base.to_string() })
    }

    pub(crate) fn anchor(&self, base: &str, name: &str) -> Result<&Value, Error> {
        self.anchors
            .get(&(base.to_string(), name.to_string()))
            .map(Anchor::contents)
            .ok_or_else(|| Error::NoSuchAnchor {
                anchor: name.to_string(),
                resource: base.to_string(),
            })
    }

    pub(crate) fn dynamic_anchor(&self, base: &str, name: &str) -> Result<&Value, Error> {
        let anchor = self
            .anchors
            .get(&(base.to_string(), name.to_string()))
            .ok_or_else(|| Error::NoSuchAnchor {
                anchor: name.to_string(),
                resource: base.to_string(),
            })?;
        if anchor.is_dynamic() {
            Ok(anchor.contents())
        } else {
            Err(Error::NoSuchAnchor {
                anchor: name.to_string(),
                resource: base.to_string(),
            })
        }
    }

    /// A resolver rooted at `base_uri`, the entry point for evaluating a
    /// compiled schema against an instance.
    pub fn try_resolver<'r>(&'r self, base_uri: &str) -> Result<Resolver<'r>, Error> {
        if !self.resources.contains_key(base_uri) {
            return Err(Error::NoSuchResource {
                uri: base_uri.to_string(),
            });
        }
        Ok(Resolver::new(self, base_uri.to_string()))
    }
}

/// Find every `$ref`/`$dynamicRef` value in `contents` whose resolved target
/// document is not `base` itself, so the BFS knows what else it needs.
fn collect_external_references(contents: &Value, base: &str) -> Result<Vec<String>, Error> {
    let mut found = Vec::new();
    walk_refs(contents, &mut found);
    let base_uri = uri::from_str(base)?;
    let mut externals = Vec::new();
    for reference in found {
        let resolved = uri::resolve_against(&base_uri.borrow(), &reference)?;
        let (doc, _fragment) = resolved.as_str().split_once('#').unwrap_or((resolved.as_str(), ""));
        if doc != base {
            externals.push(doc.to_string());
        }
    }
    Ok(externals)
}

fn walk_refs(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for key in ["$ref", "$dynamicRef"] {
                if let Some(Value::String(s)) = map.get(key) {
                    out.push(s.clone());
                }
            }
            for (key, v) in map {
                if key == "$ref" || key == "$dynamicRef" {
                    continue;
                }
                walk_refs(v, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_refs(item, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Registry {
        let schema = Draft::Draft202012.create_resource(json!({
            "type": "object",
            "properties": {
                "foo": { "type": "string" },
                "bar": { "type": "array", "items": [{"type": "number"}, {"type": "boolean"}] }
            }
        }));
        Registry::try_new("http://example.com", schema).expect("valid resources")
    }

    #[test]
    fn empty_fragment_returns_root() {
        let registry = registry();
        let resolver = registry.try_resolver("http://example.com").unwrap();
        let resolved = resolver.lookup("#").expect("lookup failed");
        assert_eq!(resolved.contents()["type"], json!("object"));
    }

    #[test]
    fn pointer_traversal_reaches_nested_schema() {
        let registry = registry();
        let resolver = registry.try_resolver("http://example.com").unwrap();
        let resolved = resolver.lookup("#/properties/foo").expect("lookup failed");
        assert_eq!(resolved.contents(), &json!({"type": "string"}));
    }

    #[test]
    fn unknown_pointer_fails() {
        let registry = registry();
        let resolver = registry.try_resolver("http://example.com").unwrap();
        assert!(resolver.lookup("#/properties/missing").is_err());
    }
}
