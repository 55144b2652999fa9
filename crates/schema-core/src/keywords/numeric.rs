//! `multipleOf`, `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`
//! (component A, exact-rational comparisons — see [`crate::number`]).
use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::{CompileError, CompileErrorKind, ValidationError, ValidationErrorKind},
    number::Rational,
    output::PartialApplication,
    paths::{JsonPointer, JsonPointerNode},
    validator::{simple_apply, EvalContext, Validate},
};

pub(crate) fn compile(
    ctx: &Context<'_>,
    object: &Map<String, Value>,
    validators: &mut Vec<Box<dyn Validate>>,
) -> Result<(), CompileError> {
    if let Some(value) = object.get("multipleOf") {
        let divisor = Rational::from_value(value)?;
        if divisor.is_zero() {
            return Err(CompileError::new(CompileErrorKind::NonPositiveMultipleOf { value: value.clone() }).at(ctx.location()));
        }
        validators.push(Box::new(MultipleOfValidator {
            divisor,
            literal: value.clone(),
            schema_path: ctx.location().pointer.push("multipleOf"),
        }));
    }

    if let Some(value) = object.get("minimum") {
        validators.push(Box::new(BoundValidator {
            limit: Rational::from_value(value)?,
            literal: value.clone(),
            kind: BoundKind::Minimum,
            schema_path: ctx.location().pointer.push("minimum"),
        }));
    }
    if let Some(value) = object.get("maximum") {
        validators.push(Box::new(BoundValidator {
            limit: Rational::from_value(value)?,
            literal: value.clone(),
            kind: BoundKind::Maximum,
            schema_path: ctx.location().pointer.push("maximum"),
        }));
    }
    if let Some(value) = object.get("exclusiveMinimum") {
        validators.push(Box::new(BoundValidator {
            limit: Rational::from_value(value)?,
            literal: value.clone(),
            kind: BoundKind::ExclusiveMinimum,
            schema_path: ctx.location().pointer.push("exclusiveMinimum"),
        }));
    }
    if let Some(value) = object.get("exclusiveMaximum") {
        validators.push(Box::new(BoundValidator {
            limit: Rational::from_value(value)?,
            literal: value.clone(),
            kind: BoundKind::ExclusiveMaximum,
            schema_path: ctx.location().pointer.push("exclusiveMaximum"),
        }));
    }

    Ok(())
}

struct MultipleOfValidator {
    divisor: Rational,
    literal: Value,
    schema_path: JsonPointer,
}

impl Validate for MultipleOfValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Number(number) = instance else {
            return simple_apply(Vec::new());
        };
        let Ok(actual) = Rational::from_json_number(number) else {
            return simple_apply(Vec::new());
        };
        if actual.is_multiple_of(&self.divisor) {
            return simple_apply(Vec::new());
        }
        simple_apply(vec![ValidationError::new(
            ValidationErrorKind::MultipleOf { multiple_of: self.literal.clone() },
            self.schema_path.clone(),
            instance_path,
            instance,
        )])
    }
}

#[derive(Clone, Copy)]
enum BoundKind {
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
}

struct BoundValidator {
    limit: Rational,
    literal: Value,
    kind: BoundKind,
    schema_path: JsonPointer,
}

impl Validate for BoundValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let Value::Number(number) = instance else {
            return simple_apply(Vec::new());
        };
        let Ok(actual) = Rational::from_json_number(number) else {
            return simple_apply(Vec::new());
        };
        let ordering = actual.compare(&self.limit);
        let ok = match self.kind {
            BoundKind::Minimum => ordering != Ordering::Less,
            BoundKind::Maximum => ordering != Ordering::Greater,
            BoundKind::ExclusiveMinimum => ordering == Ordering::Greater,
            BoundKind::ExclusiveMaximum => ordering == Ordering::Less,
        };
        if ok {
            return simple_apply(Vec::new());
        }
        let kind = match self.kind {
            BoundKind::Minimum => ValidationErrorKind::Minimum { limit: self.literal.clone() },
            BoundKind::Maximum => ValidationErrorKind::Maximum { limit: self.literal.clone() },
            BoundKind::ExclusiveMinimum => ValidationErrorKind::ExclusiveMinimum { limit: self.literal.clone() },
            BoundKind::ExclusiveMaximum => ValidationErrorKind::ExclusiveMaximum { limit: self.literal.clone() },
        };
        simple_apply(vec![ValidationError::new(kind, self.schema_path.clone(), instance_path, instance)])
    }
}
