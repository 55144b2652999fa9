//! `minLength`, `maxLength`, `pattern`, `format` (components B/C).
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    ecma,
    error::{CompileError, ValidationError, ValidationErrorKind},
    output::PartialApplication,
    paths::{JsonPointer, JsonPointerNode},
    validator::{simple_apply, EvalContext, Validate},
};

pub(crate) fn compile(
    ctx: &Context<'_>,
    object: &Map<String, Value>,
    validators: &mut Vec<Box<dyn Validate>>,
) -> Result<(), CompileError> {
    if let Some(limit) = object.get("minLength").and_then(Value::as_u64) {
        validators.push(Box::new(LengthValidator {
            limit,
            kind: LengthKind::Min,
            schema_path: ctx.location().pointer.push("minLength"),
        }));
    }
    if let Some(limit) = object.get("maxLength").and_then(Value::as_u64) {
        validators.push(Box::new(LengthValidator {
            limit,
            kind: LengthKind::Max,
            schema_path: ctx.location().pointer.push("maxLength"),
        }));
    }

    if let Some(Value::String(pattern)) = object.get("pattern") {
        let regex = ecma::compile(pattern)?;
        validators.push(Box::new(PatternValidator {
            regex,
            pattern: pattern.clone(),
            schema_path: ctx.location().pointer.push("pattern"),
        }));
    }

    if let Some(Value::String(name)) = object.get("format") {
        if ctx.config().assert_format() {
            if let Some(format) = ctx.config().formats.get(name).cloned() {
                validators.push(Box::new(FormatValidator {
                    format,
                    name: name.clone(),
                    schema_path: ctx.location().pointer.push("format"),
                }));
            }
        } else {
            validators.push(Box::new(FormatAnnotationValidator { name: name.clone() }));
        }
    }

    Ok(())
}

#[derive(Clone, Copy)]
enum LengthKind {
    Min,
    Max,
}

struct LengthValidator {
    limit: u64,
    kind: LengthKind,
    schema_path: JsonPointer,
}

impl Validate for LengthValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::String(s) = instance else {
            return simple_apply(Vec::new());
        };
        let actual = bytecount::num_chars(s.as_bytes()) as u64;
        let ok = match self.kind {
            LengthKind::Min => actual >= self.limit,
            LengthKind::Max => actual <= self.limit,
        };
        if ok {
            return simple_apply(Vec::new());
        }
        let kind = match self.kind {
            LengthKind::Min => ValidationErrorKind::MinLength { limit: self.limit, actual },
            LengthKind::Max => ValidationErrorKind::MaxLength { limit: self.limit, actual },
        };
        simple_apply(vec![ValidationError::new(kind, self.schema_path.clone(), instance_path, instance)])
    }
}

struct PatternValidator {
    regex: Arc<fancy_regex::Regex>,
    pattern: String,
    schema_path: JsonPointer,
}

impl Validate for PatternValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::String(s) = instance else {
            return simple_apply(Vec::new());
        };
        if self.regex.is_match(s).unwrap_or(false) {
            return simple_apply(Vec::new());
        }
        simple_apply(vec![ValidationError::new(
            ValidationErrorKind::Pattern { pattern: self.pattern.clone() },
            self.schema_path.clone(),
            instance_path,
            instance,
        )])
    }
}

/// `format` in annotation-only mode: never fails, just reports the format
/// name it checked so `basic`-format output can surface it.
struct FormatAnnotationValidator {
    name: String,
}

impl Validate for FormatAnnotationValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, _instance: &'i Value, _instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let mut values = Map::new();
        values.insert("format".to_string(), Value::String(self.name.clone()));
        PartialApplication::Valid {
            annotations: crate::output::Annotations { values, ..crate::output::Annotations::new() },
            child_results: Vec::new(),
        }
    }
}

struct FormatValidator {
    format: Arc<dyn crate::format::Format>,
    name: String,
    schema_path: JsonPointer,
}

impl Validate for FormatValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        if self.format.is_valid(instance) {
            return simple_apply(Vec::new());
        }
        simple_apply(vec![ValidationError::new(
            ValidationErrorKind::Format { format: self.name.clone() },
            self.schema_path.clone(),
            instance_path,
            instance,
        )])
    }
}
