//! The two disjoint error taxonomies of §7: compile-time failures that abort
//! `compile` outright, and evaluation errors, which are recorded into a
//! result rather than raised.
use std::{
    borrow::Cow,
    error, fmt,
    iter::{empty, once},
};

use serde_json::{Map, Value};

use crate::paths::{JsonPointer, JsonPointerNode, Location};

/// A fatal failure while compiling a schema document. The compiler is
/// all-or-nothing: when this is returned, no partial compiled schema is
/// ever exposed.
#[derive(Debug)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub location: Option<Location>,
}

impl CompileError {
    #[must_use]
    pub fn new(kind: CompileErrorKind) -> Self {
        CompileError {
            kind,
            location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

#[derive(Debug)]
#[allow(missing_docs)]
pub enum CompileErrorKind {
    ParseError { source: serde_json::Error },
    InvalidKeyword { keyword: &'static str, value: Value },
    RegexCompile { pattern: String, source: fancy_regex::Error },
    NumericLiteral { value: Value },
    NonPositiveMultipleOf { value: Value },
    UnresolvableRef { reference: String, source: schema_referencing::Error },
    RemoteFetch { uri: String, source: Box<dyn error::Error + Send + Sync> },
    MetaSchemaMismatch { errors: Vec<String> },
    ConfigCannotBeNil { option: &'static str },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CompileErrorKind::ParseError { source } => write!(f, "Invalid JSON document: {source}"),
            CompileErrorKind::InvalidKeyword { keyword, value } => {
                write!(f, "Invalid value for keyword '{keyword}': {value}")
            }
            CompileErrorKind::RegexCompile { pattern, source } => {
                write!(f, "Failed to compile pattern '{pattern}': {source}")
            }
            CompileErrorKind::NumericLiteral { value } => {
                write!(f, "Expected a JSON number, got {value}")
            }
            CompileErrorKind::NonPositiveMultipleOf { value } => {
                write!(f, "'multipleOf' must be strictly positive, got {value}")
            }
            CompileErrorKind::UnresolvableRef { reference, source } => {
                write!(f, "Could not resolve reference '{reference}': {source}")
            }
            CompileErrorKind::RemoteFetch { uri, source } => {
                write!(f, "Failed to fetch remote schema '{uri}': {source}")
            }
            CompileErrorKind::MetaSchemaMismatch { errors } => {
                write!(f, "Schema does not conform to its meta-schema: {}", errors.join("; "))
            }
            CompileErrorKind::ConfigCannotBeNil { option } => {
                write!(f, "Configuration option '{option}' must not be nil")
            }
        }
    }
}

impl error::Error for CompileError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            CompileErrorKind::ParseError { source } => Some(source),
            CompileErrorKind::RegexCompile { source, .. } => Some(source),
            CompileErrorKind::UnresolvableRef { source, .. } => Some(source),
            CompileErrorKind::RemoteFetch { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// One evaluation-time failure, recorded (never raised) into the result
/// tree built by the evaluator.
#[derive(Debug, Clone)]
pub struct ValidationError<'a> {
    pub instance: Cow<'a, Value>,
    pub kind: ValidationErrorKind,
    pub instance_path: JsonPointer,
    pub schema_path: JsonPointer,
}

impl<'a> ValidationError<'a> {
    pub(crate) fn new(
        kind: ValidationErrorKind,
        schema_path: JsonPointer,
        instance_path: &JsonPointerNode,
        instance: &'a Value,
    ) -> Self {
        ValidationError {
            instance: Cow::Borrowed(instance),
            kind,
            instance_path: instance_path.into(),
            schema_path,
        }
    }

    /// The stable message code used for localization, matching the keyword
    /// name for most kinds (`"minLength"`, `"required"`, …).
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        self.kind.message_key()
    }

    /// Parameters substituted into the message template for this error,
    /// threaded through to a [`crate::localization::Localizer`] unchanged.
    #[must_use]
    pub fn params(&self) -> Map<String, Value> {
        self.kind.params()
    }
}

impl fmt::Display for ValidationError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind.default_message(), self.instance_path)
    }
}

pub type ErrorIterator<'a> = Box<dyn Iterator<Item = ValidationError<'a>> + Send + Sync + 'a>;

pub(crate) fn no_error<'a>() -> ErrorIterator<'a> {
    Box::new(empty())
}

pub(crate) fn error(err: ValidationError<'_>) -> ErrorIterator<'_> {
    Box::new(once(err))
}

/// Evaluation error kinds, mirroring keyword names per §7.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum ValidationErrorKind {
    Type { expected: Vec<&'static str>, actual: &'static str },
    Enum { options: Value },
    Constant { expected: Value },
    Minimum { limit: Value },
    Maximum { limit: Value },
    ExclusiveMinimum { limit: Value },
    ExclusiveMaximum { limit: Value },
    MultipleOf { multiple_of: Value },
    MinLength { limit: u64, actual: u64 },
    MaxLength { limit: u64, actual: u64 },
    Pattern { pattern: String },
    Format { format: String },
    MinItems { limit: u64 },
    MaxItems { limit: u64 },
    UniqueItems,
    Contains,
    MinContains { limit: u64, matched: u64 },
    MaxContains { limit: u64, matched: u64 },
    MinProperties { limit: u64 },
    MaxProperties { limit: u64 },
    Required { property: String },
    DependentRequired { property: String, missing: String },
    AdditionalProperties { unexpected: Vec<String> },
    UnevaluatedProperties { unexpected: Vec<String> },
    UnevaluatedItems { indices: Vec<usize> },
    PropertyNames { property: String },
    AllOf,
    AnyOf,
    OneOfNotValid,
    OneOfMultipleValid,
    Not,
    RefResolution { reference: String, message: String },
    ContentEncoding { content_encoding: String },
    ContentMediaType { content_media_type: String },
    InfiniteLoop,
    Custom { message: String },
}

impl ValidationErrorKind {
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationErrorKind::Type { .. } => "type",
            ValidationErrorKind::Enum { .. } => "enum",
            ValidationErrorKind::Constant { .. } => "const",
            ValidationErrorKind::Minimum { .. } => "minimum",
            ValidationErrorKind::Maximum { .. } => "maximum",
            ValidationErrorKind::ExclusiveMinimum { .. } => "exclusiveMinimum",
            ValidationErrorKind::ExclusiveMaximum { .. } => "exclusiveMaximum",
            ValidationErrorKind::MultipleOf { .. } => "multipleOf",
            ValidationErrorKind::MinLength { .. } => "minLength",
            ValidationErrorKind::MaxLength { .. } => "maxLength",
            ValidationErrorKind::Pattern { .. } => "pattern",
            ValidationErrorKind::Format { .. } => "format",
            ValidationErrorKind::MinItems { .. } => "minItems",
            ValidationErrorKind::MaxItems { .. } => "maxItems",
            ValidationErrorKind::UniqueItems => "uniqueItems",
            ValidationErrorKind::Contains => "contains",
            ValidationErrorKind::MinContains { .. } => "minContains",
            ValidationErrorKind::MaxContains { .. } => "maxContains",
            ValidationErrorKind::MinProperties { .. } => "minProperties",
            ValidationErrorKind::MaxProperties { .. } => "maxProperties",
            ValidationErrorKind::Required { .. } => "required",
            ValidationErrorKind::DependentRequired { .. } => "dependentRequired",
            ValidationErrorKind::AdditionalProperties { .. } => "additional_property_mismatch",
            ValidationErrorKind::UnevaluatedProperties { .. } => "unevaluatedProperties",
            ValidationErrorKind::UnevaluatedItems { .. } => "unevaluatedItems",
            ValidationErrorKind::PropertyNames { .. } => "propertyNames",
            ValidationErrorKind::AllOf => "allOf",
            ValidationErrorKind::AnyOf => "anyOf",
            ValidationErrorKind::OneOfNotValid => "oneOf",
            ValidationErrorKind::OneOfMultipleValid => "oneOf",
            ValidationErrorKind::Not => "not",
            ValidationErrorKind::RefResolution { .. } => "ref",
            ValidationErrorKind::ContentEncoding { .. } => "contentEncoding",
            ValidationErrorKind::ContentMediaType { .. } => "contentMediaType",
            ValidationErrorKind::InfiniteLoop => "infinite_loop",
            ValidationErrorKind::Custom { .. } => "custom",
        }
    }

    #[must_use]
    pub fn params(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            ValidationErrorKind::Minimum { limit }
            | ValidationErrorKind::Maximum { limit }
            | ValidationErrorKind::ExclusiveMinimum { limit }
            | ValidationErrorKind::ExclusiveMaximum { limit } => {
                map.insert("limit".into(), limit.clone());
            }
            ValidationErrorKind::MultipleOf { multiple_of } => {
                map.insert("multipleOf".into(), multiple_of.clone());
            }
            ValidationErrorKind::MinLength { limit, actual } | ValidationErrorKind::MaxLength { limit, actual } => {
                map.insert("limit".into(), Value::from(*limit));
                map.insert("actual".into(), Value::from(*actual));
            }
            ValidationErrorKind::Pattern { pattern } => {
                map.insert("pattern".into(), Value::from(pattern.clone()));
            }
            ValidationErrorKind::Format { format } => {
                map.insert("format".into(), Value::from(format.clone()));
            }
            ValidationErrorKind::Required { property } => {
                map.insert("property".into(), Value::from(property.clone()));
            }
            ValidationErrorKind::AdditionalProperties { unexpected }
            | ValidationErrorKind::UnevaluatedProperties { unexpected } => {
                map.insert("unexpected".into(), Value::from(unexpected.clone()));
            }
            ValidationErrorKind::Type { expected, actual } => {
                map.insert("expected".into(), Value::from(expected.to_vec()));
                map.insert("actual".into(), Value::from(*actual));
            }
            _ => {}
        }
        map
    }

    #[must_use]
    pub fn default_message(&self) -> String {
        match self {
            ValidationErrorKind::Type { expected, actual } => {
                format!("{actual} is not of type {}", expected.join(", "))
            }
            ValidationErrorKind::Required { property } => format!("'{property}' is a required property"),
            ValidationErrorKind::Format { format } => format!("does not match format '{format}'"),
            ValidationErrorKind::InfiniteLoop => "recursion budget exceeded".to_string(),
            other => format!("failed '{}'", other.message_key()),
        }
    }
}

/// Failures from the `unmarshal` coercion surface (§4.K / §7).
#[derive(Debug)]
pub enum UnmarshalError {
    /// The input failed validation; the full result is attached so callers
    /// can introspect it without the unmarshal path silently dropping it.
    Validation { errors: Vec<String> },
    TypeMismatch { expected: &'static str, found: &'static str },
    NilTarget,
    NonPointerTarget,
}

impl fmt::Display for UnmarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmarshalError::Validation { errors } => {
                write!(f, "input failed validation: {}", errors.join("; "))
            }
            UnmarshalError::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            UnmarshalError::NilTarget => write!(f, "unmarshal target is nil"),
            UnmarshalError::NonPointerTarget => write!(f, "unmarshal target must be a mutable reference"),
        }
    }
}

impl error::Error for UnmarshalError {}
