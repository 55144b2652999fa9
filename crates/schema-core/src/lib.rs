//! A JSON Schema Draft 2020-12 compiler and evaluator: compiles a schema
//! document into an immutable, thread-shareable [`Validator`], evaluates
//! arbitrary JSON-shaped instances against it, and exposes the result as a
//! tree, a flat list, or localized messages. A separate coercion surface
//! ([`unmarshal`]) fills in schema `default`s and decodes the result into a
//! caller's typed target.
//!
//! ```
//! use schema_core::Validator;
//! use serde_json::json;
//!
//! let validator = Validator::for_schema(&json!({
//!     "type": "object",
//!     "properties": { "age": { "type": "integer", "minimum": 0 } },
//!     "required": ["age"]
//! })).unwrap();
//!
//! assert!(validator.is_valid(&json!({"age": 30})));
//! assert!(!validator.is_valid(&json!({"age": -1})));
//! ```
#![recursion_limit = "256"]
pub mod compiler;
pub mod content;
pub mod ecma;
pub mod error;
pub mod format;
pub mod input;
pub mod keywords;
pub mod localization;
pub mod node;
pub mod number;
pub mod options;
pub mod output;
pub mod paths;
pub mod primitive_type;
pub mod properties;
pub mod unmarshal;
pub mod validator;

pub use error::{CompileError, UnmarshalError, ValidationError};
pub use input::IntoInstance;
pub use options::{OptionsBuilder, ValidationOptions};
pub use output::EvaluationResult;
pub use unmarshal::unmarshal;
pub use validator::Validator;

use once_cell::sync::OnceCell;
use std::sync::RwLock;

/// A process-wide default compiled schema (§6.2 `setDefaultCompiler` /
/// `getDefaultCompiler`), for callers that want a single ambient validator
/// rather than threading one through explicitly.
static DEFAULT_VALIDATOR: OnceCell<RwLock<Option<Validator>>> = OnceCell::new();

fn default_slot() -> &'static RwLock<Option<Validator>> {
    DEFAULT_VALIDATOR.get_or_init(|| RwLock::new(None))
}

/// Install `validator` as the process-wide default.
pub fn set_default_validator(validator: Validator) {
    *default_slot().write().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(validator);
}

/// The process-wide default validator, if one was installed with
/// [`set_default_validator`].
#[must_use]
pub fn default_validator() -> Option<Validator> {
    default_slot().read().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
}

/// Compile `schema` with default options (§6.2 `compile`).
///
/// # Errors
/// See [`CompileError`].
pub fn compile(schema: &serde_json::Value) -> Result<Validator, CompileError> {
    Validator::for_schema(schema)
}

/// Compile several schema documents sharing one reference index
/// (§6.2 `compileBatch`): all-or-nothing, so a failure anywhere leaves no
/// partial entry in the returned map.
///
/// # Errors
/// The first [`CompileError`] encountered, keyed by the failing document's
/// name.
pub fn compile_batch<'a, I>(schemas: I) -> Result<std::collections::HashMap<String, Validator>, (String, CompileError)>
where
    I: IntoIterator<Item = (&'a str, &'a serde_json::Value)>,
{
    let mut compiled = std::collections::HashMap::new();
    for (name, schema) in schemas {
        let validator = compile(schema).map_err(|err| (name.to_string(), err))?;
        compiled.insert(name.to_string(), validator);
    }
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_validator_round_trips() {
        let validator = Validator::for_schema(&json!(true)).unwrap();
        set_default_validator(validator);
        assert!(default_validator().is_some());
    }

    #[test]
    fn compile_batch_is_all_or_nothing() {
        let good = json!({"type": "string"});
        let bad = json!({"type": 5});
        let err = compile_batch([("good", &good), ("bad", &bad)]).unwrap_err();
        assert_eq!(err.0, "bad");
    }
}
