//! The result model (component J): a tree mirroring schema traversal, plus
//! flat views over it. Localization is a side transformation over the same
//! error records (see [`crate::localization`]).
use std::collections::BTreeSet;

use ahash::AHashSet;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    error::ValidationError,
    paths::{JsonPointer, Location},
};

/// Evaluated-item/evaluated-property bookkeeping for one schema node's
/// evaluation, plus any value-producing keywords (`title`, `default`,
/// `examples`, `deprecated`, `readOnly`, `writeOnly`, `format`).
///
/// Per §4.I's annotation merge rule, annotations produced inside a failing
/// applicator branch are discarded by the caller before merging â€” this type
/// itself is just the carrier, the discard decision happens at the call site
/// (see `node.rs`'s `apply_subschemas`).
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    pub evaluated_properties: AHashSet<String>,
    pub evaluated_items: BTreeSet<usize>,
    pub values: Map<String, Value>,
}

impl Annotations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: Annotations) {
        self.evaluated_properties.extend(other.evaluated_properties);
        self.evaluated_items.extend(other.evaluated_items);
        self.values.extend(other.values);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evaluated_properties.is_empty() && self.evaluated_items.is_empty() && self.values.is_empty()
    }
}

/// The result a keyword validator's `apply` contributes to its parent: a
/// verdict plus whatever it would add to the annotation set if kept, without
/// committing the caller to treating errors vs. successes uniformly. This is
/// the type `oneOf`/`not`/`if` inspect to get the *verdict*, not the error
/// list, per §4.I.
#[derive(Debug)]
pub enum PartialApplication<'a> {
    Valid {
        annotations: Annotations,
        child_results: Vec<DetailNode<'a>>,
    },
    Invalid {
        errors: Vec<ValidationError<'a>>,
        child_results: Vec<DetailNode<'a>>,
    },
}

impl<'a> PartialApplication<'a> {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, PartialApplication::Valid { .. })
    }

    #[must_use]
    pub fn annotations(self) -> Option<Annotations> {
        match self {
            PartialApplication::Valid { annotations, .. } => Some(annotations),
            PartialApplication::Invalid { .. } => None,
        }
    }
}

/// One node of the evaluation-result tree (§3.3): mirrors one schema-node
/// evaluation, with its own errors/annotations and the same for every
/// subschema it applied.
#[derive(Debug)]
pub struct DetailNode<'a> {
    pub evaluation_path: JsonPointer,
    pub instance_location: JsonPointer,
    pub schema_location: Location,
    pub errors: Vec<ValidationError<'a>>,
    pub annotations: Annotations,
    pub children: Vec<DetailNode<'a>>,
}

impl DetailNode<'_> {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.children.iter().all(DetailNode::is_valid)
    }

    /// A flat `instance path -> messages` view, collected depth-first in
    /// schema-traversal order.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<(String, String)>) {
        for error in &self.errors {
            out.push((self.instance_location.as_str(), error.to_string()));
        }
        for child in &self.children {
            child.flatten_into(out);
        }
    }
}

/// The overall outcome of one `validate` call: whether it passed, and the
/// detail tree (§3.3).
#[derive(Debug)]
pub struct EvaluationResult<'a> {
    pub root: DetailNode<'a>,
}

impl<'a> EvaluationResult<'a> {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.root.is_valid()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<&ValidationError<'a>> {
        fn collect<'n, 'a>(node: &'n DetailNode<'a>, out: &mut Vec<&'n ValidationError<'a>>) {
            out.extend(node.errors.iter());
            for child in &node.children {
                collect(child, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }

    /// A flat `path -> message` view (§3.3, "a flat per-instance-path error
    /// map").
    #[must_use]
    pub fn to_list(&self) -> Vec<(String, String)> {
        self.root.flatten()
    }

    #[must_use]
    pub fn to_basic_output(&self) -> BasicOutput<'_, 'a> {
        BasicOutput::from_tree(&self.root)
    }

    /// The supplemented flag format (see `SPEC_FULL.md` §2): a single
    /// boolean, no detail.
    #[must_use]
    pub fn to_flag_output(&self) -> bool {
        self.is_valid()
    }
}

/// The "basic" structure of JSON Schema's standard output format (§12.2 of
/// the specification this engine implements): a flat list of per-location
/// units rather than a tree.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BasicOutput<'n, 'a> {
    Valid {
        valid: bool,
        annotations: Vec<OutputUnit<'n, 'a>>,
    },
    Invalid {
        valid: bool,
        errors: Vec<OutputUnit<'n, 'a>>,
    },
}

impl<'n, 'a> BasicOutput<'n, 'a> {
    fn from_tree(root: &'n DetailNode<'a>) -> Self {
        if root.is_valid() {
            let mut annotations = Vec::new();
            collect_annotations(root, &mut annotations);
            BasicOutput::Valid {
                valid: true,
                annotations,
            }
        } else {
            let mut errors = Vec::new();
            collect_errors(root, &mut errors);
            BasicOutput::Invalid { valid: false, errors }
        }
    }
}

fn collect_errors<'n, 'a>(node: &'n DetailNode<'a>, out: &mut Vec<OutputUnit<'n, 'a>>) {
    for error in &node.errors {
        out.push(OutputUnit {
            keyword_location: &node.evaluation_path,
            absolute_keyword_location: &node.schema_location,
            instance_location: &node.instance_location,
            description: ErrorDescription::Error(error),
        });
    }
    for child in &node.children {
        collect_errors(child, out);
    }
}

fn collect_annotations<'n, 'a>(node: &'n DetailNode<'a>, out: &mut Vec<OutputUnit<'n, 'a>>) {
    if !node.annotations.is_empty() {
        out.push(OutputUnit {
            keyword_location: &node.evaluation_path,
            absolute_keyword_location: &node.schema_location,
            instance_location: &node.instance_location,
            description: ErrorDescription::Annotation(&node.annotations),
        });
    }
    for child in &node.children {
        collect_annotations(child, out);
    }
}

#[derive(Debug)]
pub struct OutputUnit<'n, 'a> {
    pub keyword_location: &'n JsonPointer,
    pub absolute_keyword_location: &'n Location,
    pub instance_location: &'n JsonPointer,
    pub description: ErrorDescription<'n, 'a>,
}

impl Serialize for OutputUnit<'_, '_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("keywordLocation", &self.keyword_location.as_str())?;
        map.serialize_entry(
            "absoluteKeywordLocation",
            &self.absolute_keyword_location.to_string(),
        )?;
        map.serialize_entry("instanceLocation", &self.instance_location.as_str())?;
        match &self.description {
            ErrorDescription::Error(error) => {
                map.serialize_entry("error", &error.to_string())?;
            }
            ErrorDescription::Annotation(annotations) => {
                map.serialize_entry("annotation", &annotations.values)?;
            }
        }
        map.end()
    }
}

#[derive(Debug)]
pub enum ErrorDescription<'n, 'a> {
    Error(&'n ValidationError<'a>),
    Annotation(&'n Annotations),
}
