use serde_json::Value;

/// A plain-name (`$anchor`) or dynamic (`$dynamicAnchor`) anchor found while
/// indexing a resource.
#[derive(Debug, Clone)]
pub struct Anchor {
    name: String,
    contents: Value,
    dynamic: bool,
}

impl Anchor {
    pub(crate) fn new(name: impl Into<String>, contents: Value, dynamic: bool) -> Self {
        Anchor {
            name: name.into(),
            contents,
            dynamic,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn contents(&self) -> &Value {
        &self.contents
    }

    /// Whether this anchor was declared with `$dynamicAnchor` rather than
    /// `$anchor`, making it eligible for `$dynamicRef` late binding.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}
