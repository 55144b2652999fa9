use std::fmt;

use serde_json::Value;

/// The JSON type lattice used by the `type` keyword. `Integer` is a refinement
/// of `Number`: any number mathematically equal to an integer satisfies it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl PrimitiveType {
    #[must_use]
    pub fn of(value: &Value) -> PrimitiveType {
        match value {
            Value::Null => PrimitiveType::Null,
            Value::Bool(_) => PrimitiveType::Boolean,
            Value::Number(n) => {
                if is_integer(n) {
                    PrimitiveType::Integer
                } else {
                    PrimitiveType::Number
                }
            }
            Value::String(_) => PrimitiveType::String,
            Value::Array(_) => PrimitiveType::Array,
            Value::Object(_) => PrimitiveType::Object,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Null => "null",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::String => "string",
            PrimitiveType::Array => "array",
            PrimitiveType::Object => "object",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<PrimitiveType> {
        Some(match name {
            "null" => PrimitiveType::Null,
            "boolean" => PrimitiveType::Boolean,
            "integer" => PrimitiveType::Integer,
            "number" => PrimitiveType::Number,
            "string" => PrimitiveType::String,
            "array" => PrimitiveType::Array,
            "object" => PrimitiveType::Object,
            _ => return None,
        })
    }

    /// Whether an instance of `self` also satisfies the `type` gate `other`.
    /// The only non-reflexive case is `integer` satisfying `number`.
    #[must_use]
    pub fn matches(self, other: PrimitiveType) -> bool {
        self == other || (self == PrimitiveType::Integer && other == PrimitiveType::Number)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_integer(n: &serde_json::Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.fract() == 0.0 && f.is_finite())
}

/// A compact set of [`PrimitiveType`]s for the `type` keyword, which accepts
/// either a single type name or an array of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrimitiveTypesBitMap(u8);

impl PrimitiveTypesBitMap {
    #[must_use]
    pub fn new() -> Self {
        PrimitiveTypesBitMap(0)
    }

    #[must_use]
    pub fn insert(mut self, ty: PrimitiveType) -> Self {
        self.0 |= 1 << (ty as u8);
        self
    }

    #[must_use]
    pub fn contains(self, ty: PrimitiveType) -> bool {
        (self.0 & (1 << (ty as u8))) != 0
            || (ty == PrimitiveType::Integer && self.0 & (1 << (PrimitiveType::Number as u8)) != 0)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}
