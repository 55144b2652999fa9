//! Compiler configuration (component G's config surface, §6.3). All flags
//! affect compilation, never per-call evaluation (§4.G).
use std::sync::Arc;

use ahash::AHashMap;
use schema_referencing::Retrieve;
use serde_json::Value;

use crate::{
    compiler,
    error::CompileError,
    format::{Format, FormatMode, FormatRegistry},
    validator::Validator,
};

/// A user-registered default-value producer, invoked by name from a schema's
/// `default: "name()"` during `unmarshal` (§4.K / §6.3 `defaultFunctions`).
/// Must be pure or internally synchronized; the core treats it as opaque
/// (§5).
pub trait DefaultProducer: Send + Sync {
    fn produce(&self) -> Value;
}

impl<F> DefaultProducer for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn produce(&self) -> Value {
        self()
    }
}

/// A custom keyword: an escape hatch for schema-extension vocabularies that
/// is otherwise evaluated exactly like a builtin (§4.E "extra").
pub trait Keyword: crate::validator::Validate {}
impl<T: crate::validator::Validate> Keyword for T {}

pub type KeywordFactory =
    Arc<dyn Fn(&Value, &compiler::Context) -> Result<Box<dyn crate::validator::Validate>, CompileError> + Send + Sync>;

/// Frozen, immutable configuration produced by [`OptionsBuilder`] and owned
/// by the compiled [`Validator`] thereafter (§5: "owned by the compiler;
/// after compile, they are frozen and read-only during evaluation").
pub struct ValidationOptions {
    pub(crate) format_mode: FormatMode,
    pub(crate) formats: FormatRegistry,
    pub(crate) assert_content: bool,
    pub(crate) preserve_extra: bool,
    pub(crate) retriever: Arc<dyn Retrieve>,
    pub(crate) default_functions: AHashMap<String, Arc<dyn DefaultProducer>>,
    pub(crate) custom_keywords: AHashMap<String, KeywordFactory>,
    pub(crate) extra_meta_schemas: Vec<Value>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            format_mode: FormatMode::Annotation,
            formats: FormatRegistry::new(),
            assert_content: false,
            preserve_extra: false,
            retriever: Arc::new(schema_referencing::DefaultRetriever),
            default_functions: AHashMap::new(),
            custom_keywords: AHashMap::new(),
            extra_meta_schemas: Vec::new(),
        }
    }
}

impl ValidationOptions {
    #[must_use]
    pub fn assert_format(&self) -> bool {
        self.format_mode == FormatMode::Assertion
    }

    #[must_use]
    pub fn preserve_extra(&self) -> bool {
        self.preserve_extra
    }

    /// Whether `contentEncoding`/`contentMediaType` reject a non-conforming
    /// instance instead of only annotating it (§3.1 "Content",
    /// "annotation-only unless explicitly asserted").
    #[must_use]
    pub fn assert_content(&self) -> bool {
        self.assert_content
    }

    #[must_use]
    pub fn default_function(&self, name: &str) -> Option<&Arc<dyn DefaultProducer>> {
        self.default_functions.get(name)
    }
}

/// Builder for [`ValidationOptions`], mirroring the full enumeration of
/// §6.3: `assertFormat`, `preserveExtra`, `remoteLoader`, `formatRegistry`,
/// `defaultFunctions`, `metaSchemas`.
#[derive(Default)]
pub struct OptionsBuilder {
    options: ValidationOptions,
}

impl OptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        OptionsBuilder::default()
    }

    #[must_use]
    pub fn should_assert_format(mut self, enabled: bool) -> Self {
        self.options.format_mode = if enabled { FormatMode::Assertion } else { FormatMode::Annotation };
        self
    }

    #[must_use]
    pub fn should_preserve_extra(mut self, enabled: bool) -> Self {
        self.options.preserve_extra = enabled;
        self
    }

    #[must_use]
    pub fn should_assert_content(mut self, enabled: bool) -> Self {
        self.options.assert_content = enabled;
        self
    }

    #[must_use]
    pub fn with_format(mut self, name: impl Into<String>, format: impl Format + 'static) -> Self {
        self.options.formats.register(name, format);
        self
    }

    #[must_use]
    pub fn without_format(mut self, name: &str) -> Self {
        self.options.formats.unregister(name);
        self
    }

    #[must_use]
    pub fn with_retriever(mut self, retriever: impl Retrieve + 'static) -> Self {
        self.options.retriever = Arc::new(retriever);
        self
    }

    #[must_use]
    pub fn with_default_function(mut self, name: impl Into<String>, producer: impl DefaultProducer + 'static) -> Self {
        self.options.default_functions.insert(name.into(), Arc::new(producer));
        self
    }

    #[must_use]
    pub fn with_keyword(
        mut self,
        name: impl Into<String>,
        factory: impl Fn(&Value, &compiler::Context) -> Result<Box<dyn crate::validator::Validate>, CompileError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.options.custom_keywords.insert(name.into(), Arc::new(factory));
        self
    }

    #[must_use]
    pub fn with_meta_schema(mut self, schema: Value) -> Self {
        self.options.extra_meta_schemas.push(schema);
        self
    }

    /// Compile a single schema document (§6.2 `compile`).
    ///
    /// # Errors
    /// [`CompileError`] for any malformed JSON, invalid keyword shape,
    /// unresolvable reference, or invariant violation (§3.1, §4.G).
    pub fn build(self, schema: &Value) -> Result<Validator, CompileError> {
        compiler::build_validator(schema, self.options)
    }
}
