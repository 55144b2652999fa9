//! `type`, `enum`, `const`.
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::{CompileError, ValidationError, ValidationErrorKind},
    output::PartialApplication,
    paths::{JsonPointer, JsonPointerNode},
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    validator::{simple_apply, EvalContext, Validate},
};

pub(crate) fn compile(
    ctx: &Context<'_>,
    object: &Map<String, Value>,
    validators: &mut Vec<Box<dyn Validate>>,
) -> Result<(), CompileError> {
    if let Some(value) = object.get("type") {
        let mut set = PrimitiveTypesBitMap::new();
        match value {
            Value::String(name) => {
                let ty = PrimitiveType::from_name(name).ok_or_else(|| {
                    CompileError::new(crate::error::CompileErrorKind::InvalidKeyword {
                        keyword: "type",
                        value: value.clone(),
                    })
                    .at(ctx.location())
                })?;
                set = set.insert(ty);
            }
            Value::Array(names) => {
                for name in names {
                    let name = name.as_str().ok_or_else(|| {
                        CompileError::new(crate::error::CompileErrorKind::InvalidKeyword {
                            keyword: "type",
                            value: value.clone(),
                        })
                        .at(ctx.location())
                    })?;
                    let ty = PrimitiveType::from_name(name).ok_or_else(|| {
                        CompileError::new(crate::error::CompileErrorKind::InvalidKeyword {
                            keyword: "type",
                            value: value.clone(),
                        })
                        .at(ctx.location())
                    })?;
                    set = set.insert(ty);
                }
            }
            _ => {
                return Err(CompileError::new(crate::error::CompileErrorKind::InvalidKeyword {
                    keyword: "type",
                    value: value.clone(),
                })
                .at(ctx.location()))
            }
        }
        let names: Vec<&'static str> = [
            PrimitiveType::Null,
            PrimitiveType::Boolean,
            PrimitiveType::Integer,
            PrimitiveType::Number,
            PrimitiveType::String,
            PrimitiveType::Array,
            PrimitiveType::Object,
        ]
        .into_iter()
        .filter(|ty| set.contains(*ty))
        .map(PrimitiveType::name)
        .collect();
        validators.push(Box::new(TypeValidator {
            set,
            names,
            schema_path: ctx.location().pointer.push("type"),
        }));
    }

    if let Some(Value::Array(options)) = object.get("enum") {
        validators.push(Box::new(EnumValidator {
            options: options.clone(),
            schema_path: ctx.location().pointer.push("enum"),
        }));
    }

    if let Some(expected) = object.get("const") {
        validators.push(Box::new(ConstValidator {
            expected: expected.clone(),
            schema_path: ctx.location().pointer.push("const"),
        }));
    }

    Ok(())
}

struct TypeValidator {
    set: PrimitiveTypesBitMap,
    names: Vec<&'static str>,
    schema_path: JsonPointer,
}

impl Validate for TypeValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        let actual = PrimitiveType::of(instance);
        if self.set.contains(actual) {
            return simple_apply(Vec::new());
        }
        simple_apply(vec![ValidationError::new(
            ValidationErrorKind::Type {
                expected: self.names.clone(),
                actual: actual.name(),
            },
            self.schema_path.clone(),
            instance_path,
            instance,
        )])
    }
}

struct EnumValidator {
    options: Vec<Value>,
    schema_path: JsonPointer,
}

impl Validate for EnumValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        if self.options.iter().any(|option| crate::number::json_equal(option, instance)) {
            return simple_apply(Vec::new());
        }
        simple_apply(vec![ValidationError::new(
            ValidationErrorKind::Enum { options: Value::Array(self.options.clone()) },
            self.schema_path.clone(),
            instance_path,
            instance,
        )])
    }
}

struct ConstValidator {
    expected: Value,
    schema_path: JsonPointer,
}

impl Validate for ConstValidator {
    fn apply<'i>(&self, _ctx: &EvalContext<'_>, instance: &'i Value, instance_path: &JsonPointerNode) -> PartialApplication<'i> {
        if crate::number::json_equal(&self.expected, instance) {
            return simple_apply(Vec::new());
        }
        simple_apply(vec![ValidationError::new(
            ValidationErrorKind::Constant { expected: self.expected.clone() },
            self.schema_path.clone(),
            instance_path,
            instance,
        )])
    }
}
