//! `title`, `description`, `default`, `examples`, `deprecated`, `readOnly`,
//! `writeOnly`: pure annotation keywords, never assertions.
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::CompileError,
    output::{Annotations, PartialApplication},
    paths::JsonPointerNode,
    validator::{EvalContext, Validate},
};

const ANNOTATION_KEYWORDS: &[&str] = &["title", "description", "default", "examples", "deprecated", "readOnly", "writeOnly"];

pub(crate) fn compile(
    ctx: &Context<'_>,
    object: &Map<String, Value>,
    validators: &mut Vec<Box<dyn Validate>>,
) -> Result<(), CompileError> {
    let _ = ctx;
    let mut values = Map::new();
    for keyword in ANNOTATION_KEYWORDS {
        if let Some(value) = object.get(*keyword) {
            values.insert((*keyword).to_string(), value.clone());
        }
    }
    if !values.is_empty() {
        validators.push(Box::new(MetadataValidator { values }));
    }
    Ok(())
}

struct MetadataValidator {
    values: Map<String, Value>,
}

impl Validate for MetadataValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, _instance: &'i Value, _instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        PartialApplication::Valid {
            annotations: Annotations {
                values: self.values.clone(),
                ..Annotations::new()
            },
            child_results: Vec::new(),
        }
    }
}
