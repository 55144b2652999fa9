//! `contentEncoding`, `contentMediaType`, `contentSchema`: annotation-only
//! keywords per Draft 2020-12, optionally promoted to assertions when the
//! compiler is built with `assertFormat`'s content-layer counterpart
//! (§3.1 "Content"). `contentSchema` itself stays annotation-only even in
//! assertion mode: evaluating it would mean validating a value decoded from
//! the instance rather than a view of the instance, and every other
//! assertion in this crate reports errors against the original instance it
//! was handed, not a derived one.
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::{CompileError, ValidationError, ValidationErrorKind},
    output::{Annotations, PartialApplication},
    paths::JsonPointerNode,
    validator::{EvalContext, Validate},
};

pub(crate) fn compile(
    ctx: &Context<'_>,
    object: &Map<String, Value>,
    validators: &mut Vec<Box<dyn Validate>>,
) -> Result<(), CompileError> {
    let mut values = Map::new();
    let mut encoding = None;
    let mut media_type = None;
    if let Some(Value::String(text)) = object.get("contentEncoding") {
        values.insert("contentEncoding".to_string(), Value::String(text.clone()));
        encoding = Some(text.clone());
    }
    if let Some(Value::String(text)) = object.get("contentMediaType") {
        values.insert("contentMediaType".to_string(), Value::String(text.clone()));
        media_type = Some(text.clone());
    }
    if let Some(schema) = object.get("contentSchema") {
        values.insert("contentSchema".to_string(), schema.clone());
    }
    let _ = ctx;
    if !values.is_empty() {
        validators.push(Box::new(ContentValidator {
            values,
            encoding,
            media_type,
        }));
    }
    Ok(())
}

struct ContentValidator {
    values: Map<String, Value>,
    encoding: Option<String>,
    media_type: Option<String>,
}

impl Validate for ContentValidator {
    fn apply<'i>(&self, ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::String(text) = instance else {
            return PartialApplication::Valid {
                annotations: Annotations::new(),
                child_results: Vec::new(),
            };
        };
        let annotations = Annotations {
            values: self.values.clone(),
            ..Annotations::new()
        };
        if !ctx.config().assert_content() {
            return PartialApplication::Valid { annotations, child_results: Vec::new() };
        }
        let mut errors = Vec::new();
        let decoded = match self.encoding.as_deref() {
            Some("base64") => match crate::content::decode_base64(text) {
                Ok(bytes) => Some(bytes),
                Err(_) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::ContentEncoding {
                            content_encoding: self.encoding.clone().unwrap_or_default(),
                        },
                        crate::paths::JsonPointer::new(),
                        instance_path,
                        instance,
                    ));
                    None
                }
            },
            _ => Some(text.as_bytes().to_vec()),
        };
        if let (Some(bytes), Some(media_type)) = (&decoded, &self.media_type) {
            if !crate::content::matches_media_type(media_type, bytes) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ContentMediaType {
                        content_media_type: media_type.clone(),
                    },
                    crate::paths::JsonPointer::new(),
                    instance_path,
                    instance,
                ));
            }
        }
        if errors.is_empty() {
            PartialApplication::Valid { annotations, child_results: Vec::new() }
        } else {
            PartialApplication::Invalid { errors, child_results: Vec::new() }
        }
    }
}
